//! Default comparison record used whenever a pair cannot be analysed

use super::models::{
    ComparisonResult, GoodsServicesRelation, IdenticalTest, RegisteredTrademark,
    SimilarityAnalysis, SimilarityScore, TrademarkInfo,
};

pub const UNKNOWN_LIKELIHOOD: &str = "невідомо";
pub const UNAVAILABLE_DETAILS: &str = "Аналіз недоступний через помилку";

/// Build the placeholder result for `trademark`, carrying `reason` in the
/// identity-test details and the recommendations.
pub fn default_result(trademark: &RegisteredTrademark, reason: &str) -> ComparisonResult {
    let unavailable = || {
        Some(SimilarityScore {
            percentage: 0,
            details: UNAVAILABLE_DETAILS.to_string(),
        })
    };

    ComparisonResult {
        trademark_info: TrademarkInfo::from(trademark),
        identical_test: IdenticalTest {
            is_identical: false,
            percentage: 0,
            details: format!("Помилка аналізу: {reason}"),
        },
        similarity_analysis: SimilarityAnalysis {
            phonetic: unavailable(),
            graphic: unavailable(),
            semantic: unavailable(),
            visual: unavailable(),
        },
        goods_services_relation: GoodsServicesRelation {
            are_related: false,
            details: UNAVAILABLE_DETAILS.to_string(),
        },
        overall_risk: 0,
        confusion_likelihood: UNKNOWN_LIKELIHOOD.to_string(),
        recommendations: vec![
            "Перевірте налаштування API".to_string(),
            format!("Деталі помилки: {reason}"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_result_keeps_identity_and_reason() {
        let tm = RegisteredTrademark {
            application_number: "m202400123".into(),
            owner: "ТОВ Сонях".into(),
            name: "СОНЯХ".into(),
            classes: "30".into(),
            image: None,
        };
        let result = default_result(&tm, "timeout");

        assert_eq!(result.trademark_info.name, "СОНЯХ");
        assert_eq!(result.trademark_info.application_number, "m202400123");
        assert_eq!(result.overall_risk, 0);
        assert_eq!(result.confusion_likelihood, "невідомо");
        assert_eq!(result.identical_test.details, "Помилка аналізу: timeout");
        assert_eq!(result.recommendations[1], "Деталі помилки: timeout");
        assert_eq!(result.similarity_analysis.dimensions().len(), 4);
        assert!(
            result
                .similarity_analysis
                .dimensions()
                .iter()
                .all(|(_, s)| s.percentage == 0 && s.details == UNAVAILABLE_DETAILS)
        );
    }
}
