use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::RiskTier;

/// An emitted risk prediction. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub subject_id: String,
    pub score: f64,
    pub tier: RiskTier,
    pub computed_at: DateTime<Utc>,
    /// Forward horizon this prediction claims to cover.
    pub window_days: u32,
    /// Version of the active config the score was computed against.
    pub config_version: u64,
}

/// Observed ground truth for a subject, supplied after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub subject_id: String,
    pub churned: bool,
    pub observed_at: DateTime<Utc>,
}
