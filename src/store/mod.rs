pub mod config_store;
pub mod files;
pub mod ledger;
pub mod lock;

pub use config_store::ConfigStore;
pub use files::{
    activate_file, append_to_ledger, load_active_config, load_ledger, load_scoring_config,
    save_ledger, save_scoring_config,
};
pub use ledger::Ledger;
pub use lock::FileLock;
