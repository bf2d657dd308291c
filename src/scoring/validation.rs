use std::collections::HashSet;
use tracing::{debug, warn};

use super::config::{ActiveConfig, ScoringConfig};
use super::factors::{is_valid_weight, FactorRegistry};
use crate::error::{ValidationError, ValidationErrors};

/// Every violation in `config`, in check order: factors, enabled set,
/// thresholds, window policy.
pub fn collect_violations(config: &ScoringConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for (index, factor) in config.factors.iter().enumerate() {
        if !is_valid_weight(factor.weight) {
            errors.push(ValidationError::InvalidWeight {
                index,
                id: factor.id.clone(),
                weight: factor.weight,
            });
        }
        if factor.id.trim().is_empty() || factor.name.trim().is_empty() {
            errors.push(ValidationError::EmptyFactorField { index });
        }
        if !seen.insert(factor.id.as_str()) {
            errors.push(ValidationError::DuplicateFactorId {
                index,
                id: factor.id.clone(),
            });
        }
    }

    if !config.factors.iter().any(|f| f.enabled) {
        errors.push(ValidationError::NoActiveFactors);
    }

    errors.extend(config.thresholds.violations());

    if config.minimum_data_points < 1 {
        errors.push(ValidationError::InvalidWindowPolicy {
            field: "minimumDataPoints",
        });
    }
    if config.prediction_window_days < 1 {
        errors.push(ValidationError::InvalidWindowPolicy {
            field: "predictionWindowDays",
        });
    }

    errors
}

/// Validate a draft before it may become active.
/// Returns all validation errors at once (not just the first); a rejected
/// draft never partially activates.
pub fn validate_config(draft: ScoringConfig) -> Result<ActiveConfig, ValidationErrors> {
    let errors = collect_violations(&draft);
    if !errors.is_empty() {
        warn!(
            version = draft.version,
            violations = errors.len(),
            "rejected scoring config"
        );
        return Err(ValidationErrors(errors));
    }

    let registry = FactorRegistry::from_validated(draft.factors.iter().cloned());

    debug!(
        version = draft.version,
        factors = registry.len(),
        active = registry.active_factors().len(),
        "validated scoring config"
    );
    Ok(ActiveConfig::new(draft, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Factor, FactorCategory, ThresholdSet};

    fn valid_config() -> ScoringConfig {
        ScoringConfig {
            factors: vec![
                Factor::new("A", "Factor A", 0.6, FactorCategory::Behavioral),
                Factor::new("B", "Factor B", 0.4, FactorCategory::Engagement),
            ],
            thresholds: ThresholdSet::default(),
            prediction_window_days: 30,
            minimum_data_points: 1,
            version: 3,
        }
    }

    #[test]
    fn test_valid_config() {
        let active = validate_config(valid_config()).unwrap();
        assert_eq!(active.registry().len(), 2);
        assert_eq!(active.version, 3);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_weight() {
        let mut config = valid_config();
        config.factors[1].weight = 1.2;
        let errors = validate_config(config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.0[0],
            ValidationError::InvalidWeight { index: 1, .. }
        ));
    }

    #[test]
    fn test_no_enabled_factors() {
        let mut config = valid_config();
        for factor in &mut config.factors {
            factor.enabled = false;
        }
        let errors = validate_config(config).unwrap_err();
        assert_eq!(errors.0, vec![ValidationError::NoActiveFactors]);
    }

    #[test]
    fn test_empty_factor_list() {
        let mut config = valid_config();
        config.factors.clear();
        let errors = validate_config(config).unwrap_err();
        assert_eq!(errors.0, vec![ValidationError::NoActiveFactors]);
    }

    #[test]
    fn test_threshold_order_violation() {
        let mut config = valid_config();
        config.thresholds = ThresholdSet {
            low: 0.3,
            medium: 0.7,
            high: 0.5,
            critical: 0.85,
        };
        let errors = validate_config(config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::ThresholdOrderViolation { .. })));
    }

    #[test]
    fn test_invalid_window_policy() {
        let mut config = valid_config();
        config.minimum_data_points = 0;
        config.prediction_window_days = 0;
        let errors = validate_config(config).unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                ValidationError::InvalidWindowPolicy {
                    field: "minimumDataPoints"
                },
                ValidationError::InvalidWindowPolicy {
                    field: "predictionWindowDays"
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_and_empty_ids() {
        let mut config = valid_config();
        config.factors.push(Factor::new("A", "Again", 0.1, FactorCategory::Support));
        config.factors.push(Factor::new("", "Blank", 0.1, FactorCategory::Support));
        let errors = validate_config(config).unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                ValidationError::DuplicateFactorId {
                    index: 2,
                    id: "A".to_string()
                },
                ValidationError::EmptyFactorField { index: 3 },
            ]
        );
    }

    #[test]
    fn test_collects_all_errors_in_check_order() {
        let mut config = valid_config();
        config.factors[0].weight = -0.5; // weight
        config.factors[0].enabled = false;
        config.factors[1].enabled = false; // nothing enabled
        config.thresholds.critical = 0.2; // order: high >= critical
        config.minimum_data_points = 0; // window policy

        let errors = validate_config(config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors.0[0], ValidationError::InvalidWeight { .. }));
        assert_eq!(errors.0[1], ValidationError::NoActiveFactors);
        assert!(matches!(
            errors.0[2],
            ValidationError::ThresholdOrderViolation {
                lower_name: "high",
                upper_name: "critical",
                ..
            }
        ));
        assert!(matches!(
            errors.0[3],
            ValidationError::InvalidWindowPolicy { .. }
        ));
    }
}
