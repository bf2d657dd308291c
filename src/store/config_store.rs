use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::ConfigUpdateError;
use crate::scoring::{apply_all, validate_config, ActiveConfig, ConfigCommand, ScoringConfig};

/// Holds the one active scoring config and guards it with a version token.
///
/// Writers never wait on each other's validation: each update is computed
/// from the version it read, and only the final compare-and-swap takes the
/// write lock. An update whose base version is no longer current fails with
/// `StaleConfigVersion` and must be re-read and retried.
pub struct ConfigStore {
    active: RwLock<ActiveConfig>,
}

impl ConfigStore {
    pub fn new(active: ActiveConfig) -> Self {
        Self {
            active: RwLock::new(active),
        }
    }

    pub fn current(&self) -> ActiveConfig {
        self.active.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.active.read().version
    }

    /// Apply `commands` on top of the config at `expected_version`.
    pub fn update(
        &self,
        expected_version: u64,
        commands: &[ConfigCommand],
    ) -> Result<ActiveConfig, ConfigUpdateError> {
        let base = self.current();
        if base.version != expected_version {
            return Err(stale(expected_version, base.version));
        }
        let next = apply_all(base.config(), commands)?;
        self.commit(expected_version, next)
    }

    /// Replace the whole config with `draft`. `draft.version` is the version
    /// the draft was read from.
    pub fn replace(&self, draft: ScoringConfig) -> Result<ActiveConfig, ConfigUpdateError> {
        let expected_version = draft.version;
        let current = self.version();
        if current != expected_version {
            return Err(stale(expected_version, current));
        }
        let next = validate_config(draft)?;
        self.commit(expected_version, next)
    }

    fn commit(
        &self,
        expected_version: u64,
        mut next: ActiveConfig,
    ) -> Result<ActiveConfig, ConfigUpdateError> {
        let mut active = self.active.write();
        if active.version != expected_version {
            return Err(stale(expected_version, active.version));
        }
        next.set_version(expected_version + 1);
        *active = next.clone();
        info!(version = next.version, "activated scoring config");
        Ok(next)
    }
}

fn stale(expected: u64, current: u64) -> ConfigUpdateError {
    warn!(expected, current, "rejected stale config update");
    ConfigUpdateError::StaleConfigVersion { expected, current }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store_at_version(version: u64) -> ConfigStore {
        let config = ScoringConfig {
            version,
            ..ScoringConfig::default()
        };
        ConfigStore::new(validate_config(config).unwrap())
    }

    fn set_weight(weight: f64) -> ConfigCommand {
        ConfigCommand::SetWeight {
            factor_id: "usage_drop".to_string(),
            weight,
        }
    }

    #[test]
    fn test_update_advances_version() {
        let store = store_at_version(5);
        let updated = store.update(5, &[set_weight(0.5)]).unwrap();
        assert_eq!(updated.version, 6);
        assert_eq!(store.version(), 6);
        assert_eq!(
            store.current().registry().get("usage_drop").unwrap().weight,
            0.5
        );
    }

    #[test]
    fn test_second_update_with_same_version_is_stale() {
        let store = store_at_version(5);
        store.update(5, &[set_weight(0.5)]).unwrap();

        let result = store.update(5, &[set_weight(0.9)]);
        assert_eq!(
            result.unwrap_err(),
            ConfigUpdateError::StaleConfigVersion {
                expected: 5,
                current: 6
            }
        );
        // The losing write did not land.
        assert_eq!(
            store.current().registry().get("usage_drop").unwrap().weight,
            0.5
        );
    }

    #[test]
    fn test_invalid_update_leaves_active_untouched() {
        let store = store_at_version(2);
        let before = store.current();
        let result = store.update(2, &[set_weight(4.0)]);
        assert!(matches!(result, Err(ConfigUpdateError::Registry(_))));
        assert_eq!(store.current(), before);
    }

    #[test]
    fn test_replace_checks_draft_version() {
        let store = store_at_version(3);
        let mut draft = store.current().into_config();
        draft.minimum_data_points = 10;

        let stale_draft = ScoringConfig {
            version: 2,
            ..draft.clone()
        };
        assert!(matches!(
            store.replace(stale_draft),
            Err(ConfigUpdateError::StaleConfigVersion { .. })
        ));

        let active = store.replace(draft).unwrap();
        assert_eq!(active.version, 4);
        assert_eq!(active.minimum_data_points, 10);
    }

    #[test]
    fn test_replace_rejects_invalid_draft() {
        let store = store_at_version(1);
        let mut draft = store.current().into_config();
        draft.prediction_window_days = 0;
        assert!(matches!(
            store.replace(draft),
            Err(ConfigUpdateError::Invalid(_))
        ));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_concurrent_updates_exactly_one_wins() {
        let store = store_at_version(5);
        let wins = AtomicUsize::new(0);
        let stale = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for i in 0..8 {
                let store = &store;
                let wins = &wins;
                let stale = &stale;
                scope.spawn(move || match store.update(5, &[set_weight(i as f64 / 10.0)]) {
                    Ok(_) => {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(ConfigUpdateError::StaleConfigVersion { .. }) => {
                        stale.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(other) => panic!("unexpected error: {}", other),
                });
            }
        });

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert_eq!(stale.load(Ordering::SeqCst), 7);
        assert_eq!(store.version(), 6);
    }
}
