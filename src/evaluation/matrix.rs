use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Four-cell tally of predicted vs. actual positives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionMatrix {
    pub true_positives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub false_negatives: u64,
}

impl ConfusionMatrix {
    /// The matrix contribution of a single pair.
    pub fn single(predicted_positive: bool, actual_positive: bool) -> Self {
        let mut matrix = Self::default();
        matrix.record(predicted_positive, actual_positive);
        matrix
    }

    pub fn record(&mut self, predicted_positive: bool, actual_positive: bool) {
        match (predicted_positive, actual_positive) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// Zero when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// Zero when nothing was actually positive.
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall; zero when both are zero.
    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        let denominator = precision + recall;
        if denominator == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / denominator
        }
    }

    pub fn snapshot(&self, computed_at: DateTime<Utc>) -> PerformanceSnapshot {
        PerformanceSnapshot {
            true_positives: self.true_positives,
            false_positives: self.false_positives,
            true_negatives: self.true_negatives,
            false_negatives: self.false_negatives,
            accuracy: self.accuracy(),
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
            computed_at,
        }
    }
}

impl Add for ConfusionMatrix {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            true_positives: self.true_positives + other.true_positives,
            false_positives: self.false_positives + other.false_positives,
            true_negatives: self.true_negatives + other.true_negatives,
            false_negatives: self.false_negatives + other.false_negatives,
        }
    }
}

/// Zero-on-empty-denominator division. Dashboards read these values
/// directly, so an empty cell set must never surface as NaN.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Classification performance derived from a confusion matrix.
/// Always recomputed from raw pairs, never edited.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub true_positives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub false_negatives: u64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub computed_at: DateTime<Utc>,
}

impl PerformanceSnapshot {
    pub fn matrix(&self) -> ConfusionMatrix {
        ConfusionMatrix {
            true_positives: self.true_positives,
            false_positives: self.false_positives,
            true_negatives: self.true_negatives,
            false_negatives: self.false_negatives,
        }
    }

    pub fn total(&self) -> u64 {
        self.matrix().total()
    }
}
