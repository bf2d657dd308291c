pub mod join;
pub mod matrix;

pub use join::{join_within_window, JoinedPredictions};
pub use matrix::{ConfusionMatrix, PerformanceSnapshot};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::records::{Outcome, Prediction};
use crate::scoring::RiskTier;

/// Compute a performance snapshot over already-windowed pairs.
///
/// A pair counts as predicted-positive when its tier is at or above
/// `positive_tier`, and as actual-positive when the subject churned. The
/// snapshot is rebuilt from every pair on each call.
pub fn evaluate(
    pairs: &[(Prediction, Outcome)],
    positive_tier: RiskTier,
    computed_at: DateTime<Utc>,
) -> PerformanceSnapshot {
    let matrix = pairs
        .par_iter()
        .map(|(prediction, outcome)| {
            ConfusionMatrix::single(prediction.tier >= positive_tier, outcome.churned)
        })
        .reduce(ConfusionMatrix::default, |a, b| a + b);

    let snapshot = matrix.snapshot(computed_at);
    info!(
        pairs = pairs.len(),
        positive_tier = %positive_tier,
        precision = snapshot.precision,
        recall = snapshot.recall,
        f1 = snapshot.f1,
        "evaluated predictions"
    );
    snapshot
}

/// Result of evaluating a full prediction ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub positive_tier: RiskTier,
    pub snapshot: PerformanceSnapshot,
    /// Predictions still waiting for an in-window outcome.
    pub pending: usize,
}

/// Join raw predictions and outcomes by window, then evaluate the pairs.
pub fn evaluate_records(
    predictions: &[Prediction],
    outcomes: &[Outcome],
    positive_tier: RiskTier,
    computed_at: DateTime<Utc>,
) -> EvaluationReport {
    let joined = join_within_window(predictions, outcomes);
    EvaluationReport {
        positive_tier,
        snapshot: evaluate(&joined.pairs, positive_tier, computed_at),
        pending: joined.pending.len(),
    }
}
