//! Registration chance and risk banding

use serde::Serialize;

use super::models::ComparisonResult;

/// Chance reported when there is nothing to conflict with
pub const NO_CONFLICT_CHANCE: u8 = 95;

/// Estimate the chance of successful registration from per-pair results.
///
/// Only the riskiest pair matters; an empty list means no conflicts.
pub fn calculate_registration_chance(results: &[ComparisonResult]) -> u8 {
    results
        .iter()
        .map(|r| r.overall_risk)
        .max()
        .map(chance_for_max_risk)
        .unwrap_or(NO_CONFLICT_CHANCE)
}

/// Step function over the highest confusion risk. Bounds are exclusive.
pub fn chance_for_max_risk(max_risk: u8) -> u8 {
    match max_risk {
        r if r > 80 => 10,
        r if r > 60 => 30,
        r if r > 40 => 60,
        r if r > 20 => 80,
        _ => NO_CONFLICT_CHANCE,
    }
}

/// Risk band of a single comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_risk(risk: u8) -> Self {
        if risk > 60 {
            Self::High
        } else if risk > 30 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "низький",
            Self::Medium => "середній",
            Self::High => "високий",
        }
    }
}

/// How the overall registration chance reads to the applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChanceOutlook {
    Favourable,
    Uncertain,
    Unfavourable,
}

impl ChanceOutlook {
    pub fn from_chance(chance: u8) -> Self {
        if chance > 70 {
            Self::Favourable
        } else if chance > 40 {
            Self::Uncertain
        } else {
            Self::Unfavourable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Favourable => "сприятливий",
            Self::Uncertain => "невизначений",
            Self::Unfavourable => "несприятливий",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fallback::default_result;
    use crate::analysis::models::RegisteredTrademark;
    use rstest::rstest;

    fn with_risks(risks: &[u8]) -> Vec<ComparisonResult> {
        risks
            .iter()
            .map(|&risk| {
                let mut result = default_result(&RegisteredTrademark::default(), "test");
                result.overall_risk = risk;
                result
            })
            .collect()
    }

    #[test]
    fn test_empty_results_mean_no_conflicts() {
        assert_eq!(calculate_registration_chance(&[]), 95);
    }

    #[rstest]
    #[case(0, 95)]
    #[case(20, 95)]
    #[case(21, 80)]
    #[case(40, 80)]
    #[case(41, 60)]
    #[case(60, 60)]
    #[case(61, 30)]
    #[case(80, 30)]
    #[case(81, 10)]
    #[case(100, 10)]
    fn test_breakpoints(#[case] risk: u8, #[case] expected: u8) {
        assert_eq!(chance_for_max_risk(risk), expected);
        assert_eq!(calculate_registration_chance(&with_risks(&[risk])), expected);
    }

    #[test]
    fn test_only_the_highest_risk_counts() {
        assert_eq!(calculate_registration_chance(&with_risks(&[5, 85, 30])), 10);
        assert_eq!(calculate_registration_chance(&with_risks(&[45, 10])), 60);
    }

    #[rstest]
    #[case(0, RiskLevel::Low)]
    #[case(30, RiskLevel::Low)]
    #[case(31, RiskLevel::Medium)]
    #[case(60, RiskLevel::Medium)]
    #[case(61, RiskLevel::High)]
    fn test_risk_levels(#[case] risk: u8, #[case] expected: RiskLevel) {
        assert_eq!(RiskLevel::from_risk(risk), expected);
    }

    #[rstest]
    #[case(95, ChanceOutlook::Favourable)]
    #[case(70, ChanceOutlook::Uncertain)]
    #[case(41, ChanceOutlook::Uncertain)]
    #[case(40, ChanceOutlook::Unfavourable)]
    #[case(10, ChanceOutlook::Unfavourable)]
    fn test_chance_outlook(#[case] chance: u8, #[case] expected: ChanceOutlook) {
        assert_eq!(ChanceOutlook::from_chance(chance), expected);
    }
}
