//! Configuration module for world-backup
//!
//! This module handles loading, validating, and overriding configuration from TOML files.
//!
//! ## Precedence
//!
//! Settings are applied in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. The TOML file
//! 3. Environment variables (`WORK_DIR`, `BACKUP_DIR`, `BACKUP_RETENTION`, `BACKUP_WORLDS`)
//! 4. Command-line flags (handled by the binary)
//!
//! ## Example Usage
//!
//! ```no_run
//! use world_backup::config;
//!
//! let (config, created) = config::load_or_create_config("backup-config.toml")?;
//! if created {
//!     println!("Wrote default configuration");
//! }
//! println!("Backing up {:?} into {:?}", config.backup.worlds, config.backup.directory);
//! # Ok::<(), config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{
    apply_overrides, load_config, load_or_create_config, parse_config, ConfigError, Result,
    DEFAULT_CONFIG, ENV_BACKUP_DIR, ENV_BACKUP_RETENTION, ENV_BACKUP_WORLDS, ENV_WORK_DIR,
};
pub use types::{BackupSettings, Config, GlobalConfig};

use crate::utils::retention::RetentionPolicy;

impl BackupSettings {
    /// Retention policy described by `retention_count`
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.retention_count)
    }
}

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
