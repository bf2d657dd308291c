use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::RiskTier;

fn default_positive_tier() -> RiskTier {
    RiskTier::High
}

/// Application settings, read from `~/.config/churn-risk/config.yaml`.
///
/// Example YAML:
/// ```yaml
/// positive_tier: high
/// scoring_config_path: /var/lib/churn-risk/scoring.json
/// ledger_path: /var/lib/churn-risk/ledger.json
/// threads: 4
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Lowest tier that counts as a churn prediction during evaluation.
    #[serde(default = "default_positive_tier")]
    pub positive_tier: RiskTier,

    /// Active scoring config (JSON). Defaults to `scoring.json` next to the settings.
    #[serde(default)]
    pub scoring_config_path: Option<PathBuf>,

    /// Prediction/outcome ledger (JSON). Defaults to `ledger.json` next to the settings.
    #[serde(default)]
    pub ledger_path: Option<PathBuf>,

    /// Worker threads for batch scoring and evaluation. Unset uses all cores.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            positive_tier: default_positive_tier(),
            scoring_config_path: None,
            ledger_path: None,
            threads: None,
        }
    }
}
