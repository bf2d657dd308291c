pub mod commands;
pub mod config;
pub mod engine;
pub mod factors;
pub mod tiers;
pub mod validation;
pub mod window;

pub use commands::{apply, apply_all, ConfigCommand};
pub use config::{ActiveConfig, ScoringConfig};
pub use engine::{calculate_score, FactorContribution, FeatureVector, ScoreBreakdown, ScoreResult};
pub use factors::{Factor, FactorCategory, FactorRegistry};
pub use tiers::{classify, RiskTier, ThresholdSet};
pub use validation::validate_config;
pub use window::{can_predict, is_within_window, PredictionWindowPolicy};
