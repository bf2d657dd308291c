mod init;
mod schema;

pub use init::{run_init, InitSummary};
pub use schema::Settings;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/churn-risk/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("churn-risk"))
}

/// Get the default settings file path (~/.config/churn-risk/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load settings from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to the settings file. If None, uses the default
///   path and falls back to defaults when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit settings file does not exist
/// - The settings file cannot be read
/// - The YAML cannot be parsed
pub fn load_settings(path: Option<PathBuf>) -> Result<Settings> {
    let explicit = path.is_some();
    let settings_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if !settings_path.exists() {
        if explicit {
            anyhow::bail!("Settings file not found at {}", settings_path.display());
        }
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read settings file at {}", settings_path.display()))?;

    let settings: Settings = serde_saphyr::from_str(&content).with_context(|| {
        format!(
            "Failed to parse settings: invalid YAML in {}",
            settings_path.display()
        )
    })?;

    Ok(settings)
}

impl Settings {
    /// Directory that relative defaults resolve against: the settings
    /// file's own directory.
    fn base_dir(settings_path: Option<&Path>) -> Result<PathBuf> {
        match settings_path.and_then(Path::parent) {
            Some(parent) => Ok(parent.to_path_buf()),
            None => get_config_dir(),
        }
    }

    pub fn resolved_scoring_config_path(&self, settings_path: Option<&Path>) -> Result<PathBuf> {
        match &self.scoring_config_path {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::base_dir(settings_path)?.join("scoring.json")),
        }
    }

    pub fn resolved_ledger_path(&self, settings_path: Option<&Path>) -> Result<PathBuf> {
        match &self.ledger_path {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::base_dir(settings_path)?.join("ledger.json")),
        }
    }
}
