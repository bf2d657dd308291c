use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::config::ScoringConfig;
use crate::error::ScoringError;
use crate::records::{Outcome, Prediction};

/// Data-sufficiency gate and forward horizon for predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionWindowPolicy {
    pub prediction_window_days: u32,
    pub minimum_data_points: u32,
}

impl PredictionWindowPolicy {
    pub fn can_predict(&self, observation_count: u32) -> bool {
        observation_count >= self.minimum_data_points
    }

    /// Same gate as [`Self::can_predict`], as a value the scoring call can
    /// propagate.
    pub fn check(&self, observation_count: u32) -> Result<(), ScoringError> {
        if self.can_predict(observation_count) {
            Ok(())
        } else {
            Err(ScoringError::InsufficientDataPoints {
                observed: observation_count,
                required: self.minimum_data_points,
            })
        }
    }
}

pub fn can_predict(observation_count: u32, config: &ScoringConfig) -> bool {
    config.window_policy().can_predict(observation_count)
}

/// Last instant an outcome may be observed and still count for `prediction`.
///
/// `None` when the window runs past the last representable timestamp; such a
/// window has no upper bound.
pub fn window_end(prediction: &Prediction) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(prediction.window_days))
        .and_then(|span| prediction.computed_at.checked_add_signed(span))
}

/// Whether `outcome` pertains to the period `prediction` claims to cover:
/// same subject, observed in `[computed_at, computed_at + window_days]`.
pub fn is_within_window(prediction: &Prediction, outcome: &Outcome) -> bool {
    prediction.subject_id == outcome.subject_id
        && outcome.observed_at >= prediction.computed_at
        && window_end(prediction).map_or(true, |end| outcome.observed_at <= end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::RiskTier;
    use chrono::TimeZone;

    fn policy(minimum: u32) -> PredictionWindowPolicy {
        PredictionWindowPolicy {
            prediction_window_days: 30,
            minimum_data_points: minimum,
        }
    }

    fn prediction_at(day: u32) -> Prediction {
        Prediction {
            subject_id: "acme".to_string(),
            score: 0.8,
            tier: RiskTier::High,
            computed_at: Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
            window_days: 30,
            config_version: 1,
        }
    }

    fn outcome_at(subject: &str, at: DateTime<Utc>) -> Outcome {
        Outcome {
            subject_id: subject.to_string(),
            churned: true,
            observed_at: at,
        }
    }

    #[test]
    fn test_can_predict_gate() {
        let p = policy(3);
        assert!(!p.can_predict(0));
        assert!(!p.can_predict(2));
        assert!(p.can_predict(3));
        assert!(p.can_predict(100));
    }

    #[test]
    fn test_check_reports_counts() {
        assert_eq!(
            policy(5).check(2),
            Err(ScoringError::InsufficientDataPoints {
                observed: 2,
                required: 5
            })
        );
        assert_eq!(policy(5).check(5), Ok(()));
    }

    #[test]
    fn test_can_predict_from_config() {
        let config = ScoringConfig::default();
        assert!(!can_predict(config.minimum_data_points - 1, &config));
        assert!(can_predict(config.minimum_data_points, &config));
    }

    #[test]
    fn test_outcome_inside_window() {
        let prediction = prediction_at(1);
        let inside = prediction.computed_at + Duration::days(10);
        assert!(is_within_window(&prediction, &outcome_at("acme", inside)));
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let prediction = prediction_at(1);
        assert!(is_within_window(
            &prediction,
            &outcome_at("acme", prediction.computed_at)
        ));
        assert!(is_within_window(
            &prediction,
            &outcome_at("acme", window_end(&prediction).unwrap())
        ));
    }

    #[test]
    fn test_outcome_after_window_excluded() {
        let prediction = prediction_at(1);
        let late = window_end(&prediction).unwrap() + Duration::seconds(1);
        assert!(!is_within_window(&prediction, &outcome_at("acme", late)));
    }

    #[test]
    fn test_outcome_before_prediction_excluded() {
        let prediction = prediction_at(10);
        let early = prediction.computed_at - Duration::days(1);
        assert!(!is_within_window(&prediction, &outcome_at("acme", early)));
    }

    #[test]
    fn test_other_subject_excluded() {
        let prediction = prediction_at(1);
        let at = prediction.computed_at + Duration::days(1);
        assert!(!is_within_window(&prediction, &outcome_at("globex", at)));
    }

    #[test]
    fn test_huge_window_has_no_end() {
        let mut prediction = prediction_at(1);
        prediction.window_days = u32::MAX;
        assert_eq!(window_end(&prediction), None);

        let far = prediction.computed_at + Duration::days(365 * 1000);
        assert!(is_within_window(&prediction, &outcome_at("acme", far)));
        assert!(!is_within_window(
            &prediction,
            &outcome_at("acme", prediction.computed_at - Duration::seconds(1))
        ));
    }

    #[test]
    fn test_window_near_max_timestamp() {
        let mut prediction = prediction_at(1);
        prediction.computed_at = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        prediction.window_days = 30;
        assert_eq!(window_end(&prediction), None);
        assert!(is_within_window(
            &prediction,
            &outcome_at("acme", DateTime::<Utc>::MAX_UTC)
        ));

        prediction.window_days = 1;
        assert_eq!(window_end(&prediction), Some(DateTime::<Utc>::MAX_UTC));
    }
}
