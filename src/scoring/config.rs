use serde::{Deserialize, Serialize};
use std::ops::Deref;

use super::factors::{Factor, FactorCategory, FactorRegistry};
use super::tiers::ThresholdSet;
use super::window::PredictionWindowPolicy;

/// Scoring configuration as exchanged with the admin layer.
///
/// Example JSON:
/// ```json
/// {
///   "factors": [
///     { "id": "logins", "name": "Login decline", "weight": 0.6,
///       "enabled": true, "category": "engagement" }
///   ],
///   "thresholds": { "low": 0.3, "medium": 0.5, "high": 0.7, "critical": 0.85 },
///   "predictionWindowDays": 90,
///   "minimumDataPoints": 3,
///   "version": 1
/// }
/// ```
///
/// A `ScoringConfig` is always a draft. Only [`ActiveConfig`], produced by
/// validation, may be used to score.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScoringConfig {
    pub factors: Vec<Factor>,
    pub thresholds: ThresholdSet,
    pub prediction_window_days: u32,
    pub minimum_data_points: u32,
    /// Version this draft was read from; the optimistic concurrency token.
    #[serde(default)]
    pub version: u64,
}

impl ScoringConfig {
    pub fn window_policy(&self) -> PredictionWindowPolicy {
        PredictionWindowPolicy {
            prediction_window_days: self.prediction_window_days,
            minimum_data_points: self.minimum_data_points,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            factors: vec![
                Factor::new(
                    "login_decline",
                    "Decline in login frequency",
                    0.25,
                    FactorCategory::Engagement,
                ),
                Factor::new(
                    "usage_drop",
                    "Drop in core feature usage",
                    0.25,
                    FactorCategory::Behavioral,
                ),
                Factor::new(
                    "payment_failures",
                    "Failed or late payments",
                    0.2,
                    FactorCategory::Financial,
                ),
                Factor::new(
                    "seat_reduction",
                    "Reduction in licensed seats",
                    0.15,
                    FactorCategory::Financial,
                ),
                Factor::new(
                    "support_escalations",
                    "Escalated support tickets",
                    0.15,
                    FactorCategory::Support,
                ),
            ],
            thresholds: ThresholdSet::default(),
            prediction_window_days: 90,
            minimum_data_points: 3,
            version: 1,
        }
    }
}

/// A scoring config that passed validation.
///
/// Constructed only by [`super::validation::validate_config`]; carries the
/// factor registry built from the validated factor list.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveConfig {
    config: ScoringConfig,
    registry: FactorRegistry,
}

impl ActiveConfig {
    pub(crate) fn new(config: ScoringConfig, registry: FactorRegistry) -> Self {
        Self { config, registry }
    }

    pub fn registry(&self) -> &FactorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn into_config(self) -> ScoringConfig {
        self.config
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.config.version = version;
    }
}

impl Deref for ActiveConfig {
    type Target = ScoringConfig;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}
