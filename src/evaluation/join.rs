use rayon::prelude::*;
use std::collections::HashMap;

use crate::records::{Outcome, Prediction};
use crate::scoring::is_within_window;

/// Predictions split by whether an outcome has been observed for them yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedPredictions {
    pub pairs: Vec<(Prediction, Outcome)>,
    /// No outcome for the subject inside the prediction window (yet).
    pub pending: Vec<Prediction>,
}

/// Pair each prediction with the earliest outcome for the same subject
/// observed within its window.
///
/// Outcomes outside a prediction's window stay on record but are not joined
/// to it. One outcome may close several predictions for the same subject.
pub fn join_within_window(predictions: &[Prediction], outcomes: &[Outcome]) -> JoinedPredictions {
    let mut by_subject: HashMap<&str, Vec<&Outcome>> = HashMap::new();
    for outcome in outcomes {
        by_subject
            .entry(outcome.subject_id.as_str())
            .or_default()
            .push(outcome);
    }

    let matched: Vec<(&Prediction, Option<&Outcome>)> = predictions
        .par_iter()
        .map(|prediction| {
            let outcome = by_subject
                .get(prediction.subject_id.as_str())
                .and_then(|candidates| {
                    candidates
                        .iter()
                        .copied()
                        .filter(|o| is_within_window(prediction, o))
                        .min_by_key(|o| o.observed_at)
                });
            (prediction, outcome)
        })
        .collect();

    let mut joined = JoinedPredictions::default();
    for (prediction, outcome) in matched {
        match outcome {
            Some(outcome) => joined.pairs.push((prediction.clone(), outcome.clone())),
            None => joined.pending.push(prediction.clone()),
        }
    }
    joined
}
