//! Fluent API for building test configurations
//!
//! Provides a builder pattern for creating test configurations with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use world_backup::config::{BackupSettings, Config, GlobalConfig};

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    global: GlobalConfig,
    backup: BackupSettings,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with everything pointing into a temp dir
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let log_directory = temp_dir.path().join("logs");
        fs::create_dir_all(&log_directory).expect("Failed to create log_directory");

        let global = GlobalConfig {
            log_directory,
            log_level: "info".to_string(),
            log_max_files: 5,
            work_dir: None,
        };

        let backup = BackupSettings {
            directory: temp_dir.path().join("backups"),
            retention_count: 0,
            worlds: vec![],
        };

        Self {
            temp_dir,
            global,
            backup,
        }
    }

    /// Set the backup directory
    pub fn with_backup_dir(mut self, path: &Path) -> Self {
        self.backup.directory = path.to_path_buf();
        self
    }

    /// Set the retention count
    pub fn with_retention(mut self, count: i64) -> Self {
        self.backup.retention_count = count;
        self
    }

    /// Add a world path (kept in insertion order)
    pub fn add_world(mut self, path: &Path) -> Self {
        self.backup.worlds.push(path.display().to_string());
        self
    }

    /// Add a fixture world created inside the builder's temp dir
    pub fn add_fixture_world(self, name: &str) -> Self {
        let world = crate::fixtures::create_world(self.temp_dir.path(), name);
        self.add_world(&world)
    }

    /// Set the log level
    pub fn with_log_level(mut self, level: &str) -> Self {
        self.global.log_level = level.to_string();
        self
    }

    /// Set the work directory
    pub fn with_work_dir(mut self, path: &Path) -> Self {
        self.global.work_dir = Some(path.to_path_buf());
        self
    }

    /// Get the temp directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the backup directory
    pub fn backup_dir(&self) -> PathBuf {
        self.backup.directory.clone()
    }

    /// Build the Config (the temp dir is deleted when the builder drops)
    pub fn build(self) -> Config {
        Config {
            global: self.global,
            backup: self.backup,
        }
    }

    /// Keep the temp directory alive alongside the config
    pub fn persist(self) -> (Config, TempDir) {
        let config = Config {
            global: self.global,
            backup: self.backup,
        };
        (config, self.temp_dir)
    }

    /// Serialize to `config.toml` inside the temp dir
    pub fn write(self) -> (PathBuf, Config, TempDir) {
        let (config, temp_dir) = self.persist();
        let path = temp_dir.path().join("config.toml");
        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize config");
        fs::write(&path, toml_str).expect("Failed to write config");
        (path, config, temp_dir)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
