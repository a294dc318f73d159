//! Request and result types for trademark comparison

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The trademark the applicant wants to register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredTrademark {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    /// Nice classes as entered, e.g. "25, 35, 42"
    #[serde(default, deserialize_with = "lenient_text")]
    pub classes: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A previously registered trademark to compare against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisteredTrademark {
    #[serde(default, deserialize_with = "lenient_text")]
    pub application_number: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub owner: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub classes: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body of `POST /api/analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub desired_trademark: DesiredTrademark,
    pub existing_trademarks: Vec<RegisteredTrademark>,
}

impl DesiredTrademark {
    pub fn forwardable_image(&self) -> Option<&str> {
        forwardable(self.image.as_deref())
    }
}

impl RegisteredTrademark {
    pub fn forwardable_image(&self) -> Option<&str> {
        forwardable(self.image.as_deref())
    }
}

/// Only inline data URLs and web URLs can be shown to the model; the form
/// sends a bare "uploaded" marker when it could not read the file.
fn forwardable(image: Option<&str>) -> Option<&str> {
    image
        .map(str::trim)
        .filter(|s| s.starts_with("data:image/") || s.starts_with("https://") || s.starts_with("http://"))
}

/// Identifying fields of the registered trademark, echoed in every result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrademarkInfo {
    pub application_number: String,
    pub owner: String,
    pub name: String,
    pub classes: String,
}

impl From<&RegisteredTrademark> for TrademarkInfo {
    fn from(tm: &RegisteredTrademark) -> Self {
        Self {
            application_number: tm.application_number.clone(),
            owner: tm.owner.clone(),
            name: tm.name.clone(),
            classes: tm.classes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdenticalTest {
    pub is_identical: bool,
    pub percentage: u8,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub percentage: u8,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<SimilarityScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphic: Option<SimilarityScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic: Option<SimilarityScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<SimilarityScore>,
}

impl SimilarityAnalysis {
    /// Present dimensions in display order with their Ukrainian labels
    pub fn dimensions(&self) -> Vec<(&'static str, &SimilarityScore)> {
        [
            ("Фонетична схожість", &self.phonetic),
            ("Графічна схожість", &self.graphic),
            ("Семантична схожість", &self.semantic),
            ("Візуальна схожість", &self.visual),
        ]
        .into_iter()
        .filter_map(|(label, score)| score.as_ref().map(|s| (label, s)))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoodsServicesRelation {
    pub are_related: bool,
    pub details: String,
}

/// Outcome of comparing the desired trademark with one registered trademark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub trademark_info: TrademarkInfo,
    pub identical_test: IdenticalTest,
    pub similarity_analysis: SimilarityAnalysis,
    pub goods_services_relation: GoodsServicesRelation,
    /// 0-100, likelihood of confusion
    pub overall_risk: u8,
    pub confusion_likelihood: String,
    pub recommendations: Vec<String>,
}

/// Response of `POST /api/analyze`, also kept for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub results: Vec<ComparisonResult>,
    pub overall_chance: u8,
    pub analysis_date: DateTime<Utc>,
    pub analysis_id: String,
}

/// Accept strings, numbers, null, or arrays of those (joined with ", ").
///
/// Form front-ends are inconsistent about class lists and empty inputs.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number, null or list of those")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_some<D2: Deserializer<'de>>(self, deserializer: D2) -> Result<String, D2::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<String, A::Error> {
            let mut parts = Vec::new();
            while let Some(item) = seq.next_element::<serde_json::Value>()? {
                match item {
                    serde_json::Value::String(s) => parts.push(s),
                    serde_json::Value::Number(n) => parts.push(n.to_string()),
                    serde_json::Value::Null => {}
                    other => {
                        return Err(de::Error::custom(format!(
                            "unsupported list item: {other}"
                        )));
                    }
                }
            }
            Ok(parts.join(", "))
        }
    }

    deserializer.deserialize_any(TextVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registered_trademark_defaults_missing_fields() {
        let tm: RegisteredTrademark = serde_json::from_value(json!({"name": "SOLARIS"})).unwrap();
        assert_eq!(tm.name, "SOLARIS");
        assert_eq!(tm.application_number, "");
        assert_eq!(tm.owner, "");
        assert_eq!(tm.image, None);
    }

    #[test]
    fn test_lenient_text_accepts_nulls_numbers_and_lists() {
        let tm: RegisteredTrademark = serde_json::from_value(json!({
            "application_number": 123456,
            "owner": null,
            "name": "Лотос",
            "classes": [25, "35", null]
        }))
        .unwrap();
        assert_eq!(tm.application_number, "123456");
        assert_eq!(tm.owner, "");
        assert_eq!(tm.classes, "25, 35");
    }

    #[test]
    fn test_forwardable_images() {
        let mut tm = RegisteredTrademark {
            image: Some("uploaded".into()),
            ..Default::default()
        };
        assert_eq!(tm.forwardable_image(), None);

        tm.image = Some("data:image/png;base64,iVBORw0KGgo=".into());
        assert!(tm.forwardable_image().is_some());

        tm.image = Some("https://example.com/logo.png".into());
        assert!(tm.forwardable_image().is_some());
    }

    #[test]
    fn test_similarity_dimensions_skip_missing() {
        let analysis = SimilarityAnalysis {
            phonetic: Some(SimilarityScore {
                percentage: 70,
                details: "звучання".into(),
            }),
            visual: Some(SimilarityScore::default()),
            ..Default::default()
        };
        let labels: Vec<_> = analysis.dimensions().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Фонетична схожість", "Візуальна схожість"]);
    }

    #[test]
    fn test_report_date_serializes_as_rfc3339() {
        let report = AnalysisReport {
            results: vec![],
            overall_chance: 95,
            analysis_date: "2026-03-01T10:15:00Z".parse().unwrap(),
            analysis_id: "01J0000000000000000000000".into(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["analysis_date"], "2026-03-01T10:15:00Z");
        assert_eq!(value["overall_chance"], 95);
    }
}
