//! Churn risk scoring, tier classification, and prediction evaluation.
//!
//! Weighted factor observations are combined into a `[0, 1]` risk score,
//! thresholded into a [`scoring::RiskTier`], and later compared against
//! observed outcomes to produce confusion-matrix statistics.

pub mod config;
pub mod error;
pub mod evaluation;
pub mod logging;
pub mod output;
pub mod predict;
pub mod records;
pub mod scoring;
pub mod store;

pub use error::{ConfigUpdateError, RegistryError, ScoringError, ValidationError, ValidationErrors};
pub use records::{Outcome, Prediction};
