use serde::{Deserialize, Serialize};

use crate::records::{Outcome, Prediction};

pub const LEDGER_VERSION: u32 = 1;

/// Append-only record of emitted predictions and observed outcomes.
///
/// Entries can be added but never edited or removed; performance is always
/// recomputed from the full contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub version: u32,
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    outcomes: Vec<Outcome>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            version: LEDGER_VERSION,
            predictions: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn record_prediction(&mut self, prediction: Prediction) {
        self.predictions.push(prediction);
    }

    pub fn record_outcome(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }
}
