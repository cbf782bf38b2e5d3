use super::types::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_WORK_DIR: &str = "WORK_DIR";
pub const ENV_BACKUP_DIR: &str = "BACKUP_DIR";
pub const ENV_BACKUP_RETENTION: &str = "BACKUP_RETENTION";
pub const ENV_BACKUP_WORLDS: &str = "BACKUP_WORLDS";

/// Written when no config file exists yet
pub const DEFAULT_CONFIG: &str = r#"# World backup configuration
# Edit this file to customize backup settings

[global]
# Directory for log files (relative paths resolve against work_dir)
log_directory = "logs"

# trace, debug, info, warn or error
log_level = "info"

# Number of log files to keep
log_max_files = 10

# Server working directory (optional, defaults to current directory).
# Relative log, backup and world paths are resolved from here.
# work_dir = "./server"

[backup]
# Where backup archives are written
directory = "backups"

# Number of archives to keep (0 keeps all of them)
retention_count = 10

# World directories to archive, in order
worlds = ["world", "world_nether", "world_the_end"]
"#;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to write default config to {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents, |key| std::env::var(key).ok())
}

/// Like [`load_config`], but writes [`DEFAULT_CONFIG`] first when the file
/// is missing. The flag tells whether the file was created.
pub fn load_or_create_config<P: AsRef<Path>>(path: P) -> Result<(Config, bool)> {
    let path = path.as_ref();
    let created = if path.exists() {
        false
    } else {
        fs::write(path, DEFAULT_CONFIG).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        true
    };

    Ok((load_config(path)?, created))
}

/// Parse TOML, apply overrides from `lookup`, fill defaults and validate
pub fn parse_config<F>(contents: &str, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = toml::from_str(contents)?;
    apply_overrides(&mut config, lookup);

    if config.backup.directory.as_os_str().is_empty() {
        config.backup.directory = default_backup_directory();
    }

    validate_config(&config)?;
    Ok(config)
}

/// Environment overrides. Unparsable or empty values are ignored.
pub fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = lookup(ENV_WORK_DIR) {
        config.global.work_dir = Some(PathBuf::from(v));
    }
    if let Some(v) = lookup(ENV_BACKUP_DIR) {
        config.backup.directory = PathBuf::from(v);
    }
    if let Some(limit) = lookup(ENV_BACKUP_RETENTION).and_then(|v| v.trim().parse::<i64>().ok()) {
        config.backup.retention_count = limit;
    }
    if let Some(v) = lookup(ENV_BACKUP_WORLDS) {
        config.backup.worlds = v
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect();
    }
}

/// Validate the configuration
fn validate_config(config: &Config) -> Result<()> {
    if crate::managers::logging::parse_level(&config.global.log_level).is_none() {
        return Err(ConfigError::ValidationError(format!(
            "Unknown log_level '{}' (expected trace, debug, info, warn or error)",
            config.global.log_level
        )));
    }

    if config.global.log_max_files == 0 {
        return Err(ConfigError::ValidationError(
            "log_max_files must be greater than 0".to_string(),
        ));
    }

    if let Some(index) = config.backup.worlds.iter().position(|w| w.trim().is_empty()) {
        return Err(ConfigError::ValidationError(format!(
            "World entry {} is empty",
            index + 1
        )));
    }

    Ok(())
}
