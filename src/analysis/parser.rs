//! Strict validation of model replies against the comparison result shape
//!
//! The model is asked for bare JSON but frequently wraps it in Markdown
//! fences. Anything that survives fence stripping is checked field by field:
//! absent sections get neutral values, present ones must have the right type
//! and every score must be an integer in 0..=100. The echoed `trademark_info`
//! is the exception: unusable values there fall back to the input trademark.

use serde_json::{Map, Value};

use super::fallback::UNKNOWN_LIKELIHOOD;
use super::models::{
    ComparisonResult, GoodsServicesRelation, IdenticalTest, RegisteredTrademark,
    SimilarityAnalysis, SimilarityScore, TrademarkInfo,
};
use crate::errors::ResponseShapeError;

/// Risk assumed when the model omits `overall_risk`
pub const DEFAULT_OVERALL_RISK: u8 = 50;

type ShapeResult<T> = Result<T, ResponseShapeError>;

/// Remove a surrounding ```` ```json ```` / ```` ``` ```` fence if present
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a raw model reply for the pair involving `registered`
pub fn parse_reply(reply: &str, registered: &RegisteredTrademark) -> ShapeResult<ComparisonResult> {
    let value: Value = serde_json::from_str(strip_code_fences(reply))?;
    let Value::Object(root) = value else {
        return Err(ResponseShapeError::NotAnObject {
            found: type_name(&value).to_string(),
        });
    };

    Ok(ComparisonResult {
        trademark_info: trademark_info(&root, registered),
        identical_test: identical_test(&root)?,
        similarity_analysis: similarity_analysis(&root)?,
        goods_services_relation: goods_services_relation(&root)?,
        overall_risk: match present(&root, "overall_risk") {
            Some(v) => percentage("overall_risk", v)?,
            None => DEFAULT_OVERALL_RISK,
        },
        confusion_likelihood: match present(&root, "confusion_likelihood") {
            Some(v) => joined_text(v).ok_or_else(|| {
                ResponseShapeError::invalid_field(
                    "confusion_likelihood",
                    format!("expected a string, got {}", type_name(v)),
                )
            })?,
            None => UNKNOWN_LIKELIHOOD.to_string(),
        },
        recommendations: recommendations(&root)?,
    })
}

/// Identifying fields are an echo of the input; anything unusable there is
/// replaced by the input trademark's value rather than failing the reply
fn trademark_info(root: &Map<String, Value>, registered: &RegisteredTrademark) -> TrademarkInfo {
    let fallback = TrademarkInfo::from(registered);
    let Some(obj) = present(root, "trademark_info").and_then(Value::as_object) else {
        return fallback;
    };

    let field = |name: &str, default: String| -> String {
        present(obj, name).and_then(joined_text).unwrap_or(default)
    };

    TrademarkInfo {
        application_number: field("application_number", fallback.application_number),
        owner: field("owner", fallback.owner),
        name: field("name", fallback.name),
        classes: field("classes", fallback.classes),
    }
}

fn identical_test(root: &Map<String, Value>) -> ShapeResult<IdenticalTest> {
    let Some(value) = present(root, "identical_test") else {
        return Ok(IdenticalTest::default());
    };
    let obj = object("identical_test", value)?;

    Ok(IdenticalTest {
        is_identical: optional(obj, "identical_test.is_identical", "is_identical", flag)?
            .unwrap_or(false),
        percentage: optional(obj, "identical_test.percentage", "percentage", percentage)?
            .unwrap_or(0),
        details: optional(obj, "identical_test.details", "details", text)?.unwrap_or_default(),
    })
}

fn similarity_analysis(root: &Map<String, Value>) -> ShapeResult<SimilarityAnalysis> {
    let Some(value) = present(root, "similarity_analysis") else {
        return Ok(SimilarityAnalysis::default());
    };
    let obj = object("similarity_analysis", value)?;

    let score = |name: &str| -> ShapeResult<Option<SimilarityScore>> {
        let path = format!("similarity_analysis.{name}");
        let Some(value) = present(obj, name) else {
            return Ok(None);
        };
        let score = object(&path, value)?;
        Ok(Some(SimilarityScore {
            percentage: optional(score, &format!("{path}.percentage"), "percentage", percentage)?
                .unwrap_or(0),
            details: optional(score, &format!("{path}.details"), "details", text)?
                .unwrap_or_default(),
        }))
    };

    Ok(SimilarityAnalysis {
        phonetic: score("phonetic")?,
        graphic: score("graphic")?,
        semantic: score("semantic")?,
        visual: score("visual")?,
    })
}

fn goods_services_relation(root: &Map<String, Value>) -> ShapeResult<GoodsServicesRelation> {
    let Some(value) = present(root, "goods_services_relation") else {
        return Ok(GoodsServicesRelation::default());
    };
    let obj = object("goods_services_relation", value)?;

    Ok(GoodsServicesRelation {
        are_related: optional(obj, "goods_services_relation.are_related", "are_related", flag)?
            .unwrap_or(false),
        details: optional(obj, "goods_services_relation.details", "details", text)?
            .unwrap_or_default(),
    })
}

fn recommendations(root: &Map<String, Value>) -> ShapeResult<Vec<String>> {
    let Some(value) = present(root, "recommendations") else {
        return Ok(Vec::new());
    };
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| text(&format!("recommendations[{i}]"), item))
            .collect(),
        // a lone string is a one-item list
        Value::String(s) => Ok(vec![s.clone()]),
        other => Err(ResponseShapeError::invalid_field(
            "recommendations",
            format!("expected a list of strings, got {}", type_name(other)),
        )),
    }
}

/// Field value, treating JSON `null` as absent
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn optional<T>(
    obj: &Map<String, Value>,
    path: &str,
    key: &str,
    convert: fn(&str, &Value) -> ShapeResult<T>,
) -> ShapeResult<Option<T>> {
    present(obj, key).map(|v| convert(path, v)).transpose()
}

fn object<'a>(field: &str, value: &'a Value) -> ShapeResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        ResponseShapeError::invalid_field(
            field,
            format!("expected an object, got {}", type_name(value)),
        )
    })
}

fn percentage(field: &str, value: &Value) -> ShapeResult<u8> {
    let Value::Number(number) = value else {
        return Err(ResponseShapeError::invalid_field(
            field,
            format!("expected an integer, got {}", type_name(value)),
        ));
    };

    let whole = if let Some(i) = number.as_i64() {
        i
    } else if let Some(f) = number.as_f64()
        && f.fract() == 0.0
        && f.abs() < i64::MAX as f64
    {
        f as i64
    } else {
        return Err(ResponseShapeError::invalid_field(
            field,
            format!("expected an integer, got {number}"),
        ));
    };

    u8::try_from(whole)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| ResponseShapeError::OutOfRange {
            field: field.to_string(),
            value: whole,
        })
}

fn flag(field: &str, value: &Value) -> ShapeResult<bool> {
    value.as_bool().ok_or_else(|| {
        ResponseShapeError::invalid_field(
            field,
            format!("expected a boolean, got {}", type_name(value)),
        )
    })
}

fn text(field: &str, value: &Value) -> ShapeResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ResponseShapeError::invalid_field(
            field,
            format!("expected a string, got {}", type_name(other)),
        )),
    }
}

/// String, number, or a list of those joined with ", " (nulls skipped)
fn joined_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(", ")),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
