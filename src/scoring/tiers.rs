use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Ordinal risk classification. Ordering follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub const ALL: [RiskTier; 5] = [
        RiskTier::None,
        RiskTier::Low,
        RiskTier::Medium,
        RiskTier::High,
        RiskTier::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::None => "none",
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match RiskTier::ALL
            .iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s))
        {
            Some(tier) => Ok(*tier),
            None => bail!(
                "Unknown risk tier '{}': expected one of none, low, medium, high, critical",
                s
            ),
        }
    }
}

/// Four cut points partitioning `[0, 1]` into five tiers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdSet {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            low: 0.3,
            medium: 0.5,
            high: 0.7,
            critical: 0.85,
        }
    }
}

impl ThresholdSet {
    fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("low", self.low),
            ("medium", self.medium),
            ("high", self.high),
            ("critical", self.critical),
        ]
    }

    /// Every range and ordering violation in this set.
    pub fn violations(&self) -> Vec<ValidationError> {
        let named = self.named();
        let mut errors = Vec::new();

        for (name, value) in named {
            let in_range = value > 0.0 && value < 1.0;
            if !in_range {
                errors.push(ValidationError::ThresholdOutOfRange { name, value });
            }
        }

        for pair in named.windows(2) {
            let (lower_name, lower) = pair[0];
            let (upper_name, upper) = pair[1];
            // NaN compares as unordered and counts as a violation.
            if lower.partial_cmp(&upper) != Some(Ordering::Less) {
                errors.push(ValidationError::ThresholdOrderViolation {
                    lower_name,
                    lower,
                    upper_name,
                    upper,
                });
            }
        }

        errors
    }

    /// Map a score to its tier. Half-open intervals; a score equal to a cut
    /// point belongs to the higher tier.
    pub fn classify(&self, score: f64) -> RiskTier {
        if score >= self.critical {
            RiskTier::Critical
        } else if score >= self.high {
            RiskTier::High
        } else if score >= self.medium {
            RiskTier::Medium
        } else if score >= self.low {
            RiskTier::Low
        } else {
            RiskTier::None
        }
    }
}

pub fn classify(score: f64, thresholds: &ThresholdSet) -> RiskTier {
    thresholds.classify(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_interior_points() {
        let t = ThresholdSet::default();
        assert_eq!(classify(0.1, &t), RiskTier::None);
        assert_eq!(classify(0.4, &t), RiskTier::Low);
        assert_eq!(classify(0.56, &t), RiskTier::Medium);
        assert_eq!(classify(0.75, &t), RiskTier::High);
        assert_eq!(classify(0.9, &t), RiskTier::Critical);
    }

    #[test]
    fn test_classify_ties_go_to_higher_tier() {
        let t = ThresholdSet::default();
        assert_eq!(classify(0.3, &t), RiskTier::Low);
        assert_eq!(classify(0.5, &t), RiskTier::Medium);
        assert_eq!(classify(0.7, &t), RiskTier::High);
        assert_eq!(classify(0.85, &t), RiskTier::Critical);
    }

    #[test]
    fn test_classify_range_ends() {
        let t = ThresholdSet::default();
        assert_eq!(classify(0.0, &t), RiskTier::None);
        assert_eq!(classify(1.0, &t), RiskTier::Critical);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(RiskTier::None < RiskTier::Low);
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::Medium < RiskTier::High);
        assert!(RiskTier::High < RiskTier::Critical);
    }

    #[test]
    fn test_valid_thresholds_have_no_violations() {
        assert!(ThresholdSet::default().violations().is_empty());
    }

    #[test]
    fn test_equal_thresholds_violate_order() {
        let t = ThresholdSet {
            low: 0.3,
            medium: 0.3,
            high: 0.7,
            critical: 0.85,
        };
        let violations = t.violations();
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            ValidationError::ThresholdOrderViolation {
                lower_name: "low",
                upper_name: "medium",
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_thresholds() {
        let t = ThresholdSet {
            low: 0.0,
            medium: 0.5,
            high: 0.7,
            critical: 1.0,
        };
        let violations = t.violations();
        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .all(|v| matches!(v, ValidationError::ThresholdOutOfRange { .. })));
    }

    #[test]
    fn test_nan_threshold_is_violation() {
        let t = ThresholdSet {
            low: 0.3,
            medium: f64::NAN,
            high: 0.7,
            critical: 0.85,
        };
        // Out of range, plus both neighbouring comparisons fail.
        assert_eq!(t.violations().len(), 3);
    }

    #[test]
    fn test_parse_tier() {
        assert_eq!("high".parse::<RiskTier>().unwrap(), RiskTier::High);
        assert_eq!(" Critical ".parse::<RiskTier>().unwrap(), RiskTier::Critical);
        assert!("severe".parse::<RiskTier>().is_err());
    }

    #[test]
    fn test_tier_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RiskTier::Medium).unwrap(), "\"medium\"");
    }
}
