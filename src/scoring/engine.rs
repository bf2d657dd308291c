use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::factors::FactorRegistry;
use crate::error::ScoringError;

/// Observed factor values for one subject at one point in time.
///
/// Values are expected pre-normalized to `[0, 1]`. A factor absent from the
/// vector is missing for that scoring call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, factor_id: &str, value: f64) {
        self.0.insert(factor_id.to_string(), value);
    }

    pub fn get(&self, factor_id: &str) -> Option<f64> {
        self.0.get(factor_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, f64)> for FeatureVector {
    fn from_iter<T: IntoIterator<Item = (&'a str, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub factor_id: String,
    pub label: String,
    pub weight: f64,
    pub value: f64,
    /// `weight * value`
    pub weighted: f64,
    /// Portion of the final score owed to this factor; shares sum to the score.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub total_weight: f64,
    pub factors: Vec<FactorContribution>,
    /// Enabled factors left out because the vector had no usable value.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Weighted mean of the enabled factors that have a value in `features`.
///
/// Enabled factors without a value are dropped from both numerator and
/// denominator rather than counted as zero. Non-finite values count as
/// missing; finite values outside `[0, 1]` are clamped.
pub fn calculate_score(
    features: &FeatureVector,
    registry: &FactorRegistry,
) -> Result<ScoreResult, ScoringError> {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut present = Vec::new();
    let mut skipped = Vec::new();

    // Registry iterates in id order, so the sums are reproducible bit for bit.
    for factor in registry.active_factors() {
        let Some(raw) = features.get(&factor.id) else {
            skipped.push(factor.id.clone());
            continue;
        };
        if !raw.is_finite() {
            warn!(factor = %factor.id, value = raw, "ignoring non-finite feature value");
            skipped.push(factor.id.clone());
            continue;
        }
        let value = raw.clamp(0.0, 1.0);
        if value != raw {
            debug!(factor = %factor.id, raw, value, "clamped feature value into [0, 1]");
        }

        let weighted = factor.weight * value;
        weighted_sum += weighted;
        total_weight += factor.weight;
        present.push((factor, value, weighted));
    }

    // Covers both "nothing present" and "everything present has zero weight".
    if total_weight <= 0.0 {
        return Err(ScoringError::NoActiveFactors);
    }

    let score = (weighted_sum / total_weight).clamp(0.0, 1.0);

    let factors = present
        .into_iter()
        .map(|(factor, value, weighted)| FactorContribution {
            factor_id: factor.id.clone(),
            label: factor.name.clone(),
            weight: factor.weight,
            value,
            weighted,
            share: weighted / total_weight,
        })
        .collect();

    Ok(ScoreResult {
        score,
        breakdown: ScoreBreakdown {
            total_weight,
            factors,
            skipped,
        },
    })
}
