use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScoringError;
use crate::records::Prediction;
use crate::scoring::{calculate_score, ActiveConfig, FeatureVector, ScoreBreakdown};

/// One subject to score, as supplied by whatever triggers a prediction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScoringRequest {
    pub subject_id: String,
    pub features: FeatureVector,
    pub observation_count: u32,
}

/// A prediction together with the breakdown that explains its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedPrediction {
    pub prediction: Prediction,
    pub breakdown: ScoreBreakdown,
}

/// Score one subject against the active config.
///
/// The data-sufficiency gate runs first: a subject with too few observations
/// yields `InsufficientDataPoints` even if its features could be scored.
pub fn predict_explained(
    subject_id: &str,
    features: &FeatureVector,
    observation_count: u32,
    config: &ActiveConfig,
    computed_at: DateTime<Utc>,
) -> Result<ExplainedPrediction, ScoringError> {
    let policy = config.window_policy();
    if let Err(e) = policy.check(observation_count) {
        debug!(subject = subject_id, observation_count, "skipping prediction: {}", e);
        return Err(e);
    }

    let result = calculate_score(features, config.registry())?;
    let tier = config.thresholds.classify(result.score);

    Ok(ExplainedPrediction {
        prediction: Prediction {
            subject_id: subject_id.to_string(),
            score: result.score,
            tier,
            computed_at,
            window_days: policy.prediction_window_days,
            config_version: config.version,
        },
        breakdown: result.breakdown,
    })
}

pub fn predict(
    subject_id: &str,
    features: &FeatureVector,
    observation_count: u32,
    config: &ActiveConfig,
    computed_at: DateTime<Utc>,
) -> Result<Prediction, ScoringError> {
    predict_explained(subject_id, features, observation_count, config, computed_at)
        .map(|explained| explained.prediction)
}

/// Score many subjects in parallel. Results keep the order of `requests`.
pub fn predict_batch(
    requests: &[ScoringRequest],
    config: &ActiveConfig,
    computed_at: DateTime<Utc>,
) -> Vec<(String, Result<ExplainedPrediction, ScoringError>)> {
    requests
        .par_iter()
        .map(|request| {
            let result = predict_explained(
                &request.subject_id,
                &request.features,
                request.observation_count,
                config,
                computed_at,
            );
            (request.subject_id.clone(), result)
        })
        .collect()
}
