use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{get_config_path, Settings};
use crate::scoring::ScoringConfig;
use crate::store::save_scoring_config;

/// Files written by [`run_init`].
#[derive(Debug, Clone, PartialEq)]
pub struct InitSummary {
    pub settings_path: PathBuf,
    pub scoring_config_path: PathBuf,
}

/// Write default settings and a default active scoring config.
///
/// Refuses to overwrite either file unless `force` is set, and checks both
/// before writing anything.
pub fn run_init(settings_path: Option<PathBuf>, force: bool) -> Result<InitSummary> {
    let settings_path = match settings_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    let settings = Settings::default();
    let scoring_config_path = settings.resolved_scoring_config_path(Some(&settings_path))?;

    if !force {
        for path in [&settings_path, &scoring_config_path] {
            if path.exists() {
                anyhow::bail!(
                    "{} already exists. Re-run with --force to overwrite.",
                    path.display()
                );
            }
        }
    }

    let yaml = serde_saphyr::to_string(&settings)
        .map_err(|e| anyhow::anyhow!("Failed to serialize settings: {}", e))?;

    if let Some(parent) = settings_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(&settings_path, &yaml)
        .with_context(|| format!("Failed to write settings to {}", settings_path.display()))?;

    save_scoring_config(&scoring_config_path, &ScoringConfig::default())?;

    Ok(InitSummary {
        settings_path,
        scoring_config_path,
    })
}
