use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

use super::ledger::{Ledger, LEDGER_VERSION};
use super::lock::FileLock;
use crate::error::ConfigUpdateError;
use crate::scoring::{validate_config, ActiveConfig, ScoringConfig};

fn write_json_atomically<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory at {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

/// Read a scoring config (draft or active) from a JSON file.
pub fn load_scoring_config(path: &Path) -> Result<ScoringConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open scoring config at {}", path.display()))?;
    let config: ScoringConfig = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse scoring config: invalid JSON in {}", path.display()))?;
    Ok(config)
}

/// Load the persisted active config and re-validate it before use.
pub fn load_active_config(path: &Path) -> Result<ActiveConfig> {
    let config = load_scoring_config(path)?;
    let active = validate_config(config)
        .with_context(|| format!("Stored scoring config at {} is not valid", path.display()))?;
    Ok(active)
}

pub fn save_scoring_config(path: &Path, config: &ScoringConfig) -> Result<()> {
    write_json_atomically(path, config)
}

/// Validate `draft` and make it the active config stored at `path`.
///
/// `draft.version` must equal the stored version (0 when nothing is stored
/// yet); the stored config is rewritten with the next version. Stale or
/// invalid drafts surface as a [`ConfigUpdateError`] inside the returned error.
///
/// The version check and the write happen under one file lock, so of several
/// writers holding the same version exactly one commits.
pub fn activate_file(path: &Path, draft: ScoringConfig) -> Result<ActiveConfig> {
    let _lock = FileLock::acquire(path)?;
    let current = if path.exists() {
        load_scoring_config(path)?.version
    } else {
        0
    };
    if draft.version != current {
        return Err(ConfigUpdateError::StaleConfigVersion {
            expected: draft.version,
            current,
        }
        .into());
    }

    let mut active = validate_config(draft).map_err(ConfigUpdateError::Invalid)?;
    active.set_version(current + 1);
    save_scoring_config(path, active.config())?;

    info!(version = active.version, path = %path.display(), "activated scoring config");
    Ok(active)
}

/// Load the prediction ledger. A missing file is an empty ledger.
pub fn load_ledger(path: &Path) -> Result<Ledger> {
    if !path.exists() {
        return Ok(Ledger::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open ledger at {}", path.display()))?;
    let ledger: Ledger = serde_json::from_reader(file).context("Failed to load ledger")?;

    if ledger.version != LEDGER_VERSION {
        anyhow::bail!("Unsupported ledger version: {}", ledger.version);
    }

    Ok(ledger)
}

pub fn save_ledger(path: &Path, ledger: &Ledger) -> Result<()> {
    write_json_atomically(path, ledger)
}

/// Load the ledger, let `append` add entries, and save it, all under the
/// ledger's file lock so concurrent appends are never lost.
pub fn append_to_ledger<R>(path: &Path, append: impl FnOnce(&mut Ledger) -> R) -> Result<R> {
    let _lock = FileLock::acquire(path)?;
    let mut ledger = load_ledger(path)?;
    let result = append(&mut ledger);
    save_ledger(path, &ledger)?;
    Ok(result)
}
