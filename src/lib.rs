//! World Backup Library
//!
//! Snapshots world directories into timestamped zip archives and keeps the
//! number of archives bounded.

pub mod config;
pub mod error;
pub mod managers;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, load_or_create_config, BackupSettings, Config};
pub use error::{BackupError, DirectoryStage};
pub use managers::backup::{BackupManager, BackupOutcome, BackupReport};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LogHooks, LoggingConfig, TracingHooks};
