use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub backup: BackupSettings,
}

/// Global configuration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Logging configuration
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,

    /// Server working directory; world paths are resolved from here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_level: default_log_level(),
            log_max_files: default_log_max_files(),
            work_dir: None,
        }
    }
}

/// What to back up, where to, and how many archives to keep
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackupSettings {
    /// Directory the archives are written to
    #[serde(default = "default_backup_directory")]
    pub directory: PathBuf,

    /// Archives kept after rotation; zero or negative keeps everything
    #[serde(default)]
    pub retention_count: i64,

    /// Candidate world directories, archived in this order
    #[serde(default = "default_worlds")]
    pub worlds: Vec<String>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            directory: default_backup_directory(),
            retention_count: 0,
            worlds: default_worlds(),
        }
    }
}

// Default value functions

pub(crate) fn default_backup_directory() -> PathBuf { PathBuf::from("backups") }
fn default_worlds() -> Vec<String> {
    vec![
        "world".to_string(),
        "world_nether".to_string(),
        "world_the_end".to_string(),
    ]
}
fn default_log_directory() -> PathBuf { PathBuf::from("logs") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
