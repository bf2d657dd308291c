use serde::{Deserialize, Serialize};

use super::config::{ActiveConfig, ScoringConfig};
use super::factors::{Factor, FactorRegistry};
use super::tiers::ThresholdSet;
use super::validation::validate_config;
use crate::error::ConfigUpdateError;

/// An edit to a scoring config, as issued by the admin layer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ConfigCommand {
    AddFactor {
        factor: Factor,
    },
    #[serde(rename_all = "camelCase")]
    SetWeight {
        factor_id: String,
        weight: f64,
    },
    #[serde(rename_all = "camelCase")]
    SetEnabled {
        factor_id: String,
        enabled: bool,
    },
    SetThresholds {
        thresholds: ThresholdSet,
    },
    #[serde(rename_all = "camelCase")]
    SetWindowPolicy {
        prediction_window_days: u32,
        minimum_data_points: u32,
    },
}

fn factor_mut<'a>(config: &'a mut ScoringConfig, factor_id: &str) -> Option<&'a mut Factor> {
    config.factors.iter_mut().find(|f| f.id == factor_id)
}

// The registry checks each edit; the draft's factor list keeps the order the
// admin gave it, with added factors at the end.
fn apply_to_draft(
    config: &mut ScoringConfig,
    registry: &mut FactorRegistry,
    command: &ConfigCommand,
) -> Result<(), ConfigUpdateError> {
    match command {
        ConfigCommand::AddFactor { factor } => {
            registry.add_factor(factor.clone())?;
            config.factors.push(factor.clone());
        }
        ConfigCommand::SetWeight { factor_id, weight } => {
            registry.set_weight(factor_id, *weight)?;
            if let Some(factor) = factor_mut(config, factor_id) {
                factor.weight = *weight;
            }
        }
        ConfigCommand::SetEnabled { factor_id, enabled } => {
            registry.set_enabled(factor_id, *enabled)?;
            if let Some(factor) = factor_mut(config, factor_id) {
                factor.enabled = *enabled;
            }
        }
        ConfigCommand::SetThresholds { thresholds } => config.thresholds = *thresholds,
        ConfigCommand::SetWindowPolicy {
            prediction_window_days,
            minimum_data_points,
        } => {
            config.prediction_window_days = *prediction_window_days;
            config.minimum_data_points = *minimum_data_points;
        }
    }
    Ok(())
}

/// Apply `commands` in order to a copy of `base`, then validate the result once.
///
/// `base` is never modified. The returned config keeps `base.version`; the
/// store assigns the next version when it commits.
pub fn apply_all(
    base: &ScoringConfig,
    commands: &[ConfigCommand],
) -> Result<ActiveConfig, ConfigUpdateError> {
    let mut draft = base.clone();
    let mut registry = FactorRegistry::from_factors(base.factors.iter().cloned())?;

    for command in commands {
        apply_to_draft(&mut draft, &mut registry, command)?;
    }

    Ok(validate_config(draft)?)
}

pub fn apply(
    base: &ScoringConfig,
    command: &ConfigCommand,
) -> Result<ActiveConfig, ConfigUpdateError> {
    apply_all(base, std::slice::from_ref(command))
}
