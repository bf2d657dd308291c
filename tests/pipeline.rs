use chrono::{DateTime, Duration, TimeZone, Utc};
use std::env;
use std::fs;
use std::path::PathBuf;

use churn_risk::predict::{predict_batch, ScoringRequest};
use churn_risk::scoring::{FeatureVector, RiskTier, ScoringConfig};
use churn_risk::store::{activate_file, load_active_config, load_ledger, save_ledger, Ledger};
use churn_risk::{ConfigUpdateError, Outcome, ScoringError};

const FACTOR_IDS: [&str; 5] = [
    "login_decline",
    "usage_drop",
    "payment_failures",
    "seat_reduction",
    "support_escalations",
];

fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("churn_risk_pipeline_{}", name));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn computed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn uniform(subject: &str, value: f64, observations: u32) -> ScoringRequest {
    ScoringRequest {
        subject_id: subject.to_string(),
        features: FACTOR_IDS.iter().map(|id| (*id, value)).collect(),
        observation_count: observations,
    }
}

fn outcome(subject: &str, churned: bool, days_after: i64) -> Outcome {
    Outcome {
        subject_id: subject.to_string(),
        churned,
        observed_at: computed_at() + Duration::days(days_after),
    }
}

#[test]
fn test_score_record_and_evaluate() {
    let dir = scratch_dir("full");
    let scoring_path = dir.join("scoring.json");
    let ledger_path = dir.join("ledger.json");

    let draft = ScoringConfig {
        version: 0,
        ..ScoringConfig::default()
    };
    let activated = activate_file(&scoring_path, draft).unwrap();
    assert_eq!(activated.version, 1);

    let active = load_active_config(&scoring_path).unwrap();
    assert_eq!(active.version, 1);

    let mut sparse = FeatureVector::new();
    sparse.insert("login_decline", 0.2);
    let requests = vec![
        uniform("acme", 0.9, 6),
        uniform("globex", 0.1, 6),
        uniform("initech", 0.8, 4),
        ScoringRequest {
            subject_id: "umbrella".to_string(),
            features: sparse,
            observation_count: 5,
        },
        uniform("hooli", 0.95, 1),
    ];

    let results = predict_batch(&requests, &active, computed_at());
    let subjects: Vec<&str> = results.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(subjects, vec!["acme", "globex", "initech", "umbrella", "hooli"]);

    let tiers: Vec<Option<RiskTier>> = results
        .iter()
        .map(|(_, r)| r.as_ref().ok().map(|e| e.prediction.tier))
        .collect();
    assert_eq!(
        tiers,
        vec![
            Some(RiskTier::Critical),
            Some(RiskTier::None),
            Some(RiskTier::High),
            Some(RiskTier::None),
            None,
        ]
    );
    assert!(matches!(
        results[4].1,
        Err(ScoringError::InsufficientDataPoints {
            observed: 1,
            required: 3
        })
    ));

    let mut ledger = Ledger::new();
    for (_, result) in results {
        if let Ok(explained) = result {
            assert_eq!(explained.prediction.config_version, 1);
            ledger.record_prediction(explained.prediction);
        }
    }
    ledger.record_outcome(outcome("acme", true, 30));
    ledger.record_outcome(outcome("globex", false, 30));
    ledger.record_outcome(outcome("initech", false, 10));
    // Past the 90 day window, so umbrella stays pending.
    ledger.record_outcome(outcome("umbrella", true, 200));
    save_ledger(&ledger_path, &ledger).unwrap();

    let reloaded = load_ledger(&ledger_path).unwrap();
    assert_eq!(reloaded.predictions().len(), 4);
    assert_eq!(reloaded.outcomes().len(), 4);

    let report = churn_risk::evaluation::evaluate_records(
        reloaded.predictions(),
        reloaded.outcomes(),
        RiskTier::High,
        computed_at() + Duration::days(365),
    );
    let s = &report.snapshot;
    assert_eq!(report.pending, 1);
    assert_eq!(s.true_positives, 1);
    assert_eq!(s.false_positives, 1);
    assert_eq!(s.true_negatives, 1);
    assert_eq!(s.false_negatives, 0);
    assert!((s.precision - 0.5).abs() < 1e-12);
    assert!((s.recall - 1.0).abs() < 1e-12);
    assert!((s.accuracy - 2.0 / 3.0).abs() < 1e-12);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_activation_requires_current_version() {
    let dir = scratch_dir("versions");
    let scoring_path = dir.join("scoring.json");

    let first = ScoringConfig {
        version: 0,
        ..ScoringConfig::default()
    };
    activate_file(&scoring_path, first.clone()).unwrap();

    // Same draft again: it was read at version 0, but the store is at 1.
    let err = activate_file(&scoring_path, first).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigUpdateError>(),
        Some(ConfigUpdateError::StaleConfigVersion {
            expected: 0,
            current: 1
        })
    ));

    let mut next = load_active_config(&scoring_path).unwrap().into_config();
    next.thresholds.low = 0.9;
    let err = activate_file(&scoring_path, next.clone()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigUpdateError>(),
        Some(ConfigUpdateError::Invalid(_))
    ));

    next.thresholds.low = 0.2;
    let active = activate_file(&scoring_path, next).unwrap();
    assert_eq!(active.version, 2);
    assert_eq!(load_active_config(&scoring_path).unwrap().thresholds.low, 0.2);

    let _ = fs::remove_dir_all(&dir);
}
