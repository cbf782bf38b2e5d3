//! Logging manager with file rotation
//!
//! Provides dual-output logging:
//! - Console: INFO level with concise format
//! - File: configured level with daily rotation
//!
//! The backup engine itself never touches the global subscriber. It reports
//! progress through a [`LogHooks`] value handed to it by the caller.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "world-backup";

/// Severity-tagged sinks the backup engine writes progress to
pub trait LogHooks {
    /// Normal progress ("created backup X", "deleting old backup Y")
    fn info(&self, message: &str);

    /// Non-fatal problems, such as a failed rotation
    fn warn(&self, message: &str);
}

/// Forwards engine messages to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHooks;

impl LogHooks for TracingHooks {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for log files
    pub log_directory: PathBuf,
    /// Log level for file output (console always uses INFO)
    pub log_level: Level,
    /// Maximum number of log files to keep
    pub max_files: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from("logs"),
            log_level: Level::DEBUG,
            max_files: 10,
        }
    }
}

impl LoggingConfig {
    /// Create from global config values
    pub fn from_config(log_directory: &Path, log_level: &str, max_files: u32) -> Self {
        Self {
            log_directory: log_directory.to_path_buf(),
            log_level: parse_level(log_level).unwrap_or(Level::INFO),
            max_files,
        }
    }
}

/// Parse a level name; `warning` is accepted as an alias of `warn`
pub fn parse_level(name: &str) -> Option<Level> {
    match name.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize logging with console and file outputs
///
/// Returns a guard that must be kept alive for the duration of the program.
/// When the guard is dropped, any remaining logs are flushed to disk.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    let log_dir = crate::config::expand_tilde(&config.log_directory);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &log_dir,
        format!("{}.log", LOG_FILE_PREFIX),
    );

    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_filter(level_filter(config.log_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_filter(level_filter(Level::INFO));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    cleanup_old_logs(&log_dir, config.max_files)?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Initialize simple console-only logging (for when config isn't available)
pub fn init_console_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed (tests, embedding callers)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .try_init();
}

/// Create a level filter for tracing layers
fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("world_backup={}", level))
            .add_directive(Directive::from(tracing::level_filters::LevelFilter::from_level(level)))
    })
}

/// Cleanup old log files, keeping only the most recent N files
fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<()> {
    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(LOG_FILE_PREFIX) && name.contains(".log")
        })
        .collect();

    // Newest first
    log_files.sort_by(|a, b| {
        let a_time = a.metadata().and_then(|m| m.modified()).ok();
        let b_time = b.metadata().and_then(|m| m.modified()).ok();
        b_time.cmp(&a_time)
    });

    for file in log_files.into_iter().skip(max_files as usize) {
        if let Err(e) = fs::remove_file(file.path()) {
            tracing::warn!("Failed to remove old log file {:?}: {}", file.path(), e);
        } else {
            tracing::debug!("Removed old log file: {:?}", file.path());
        }
    }

    Ok(())
}

/// Guard that keeps the logging system alive
///
/// When dropped, flushes any remaining logs to disk.
pub struct LogGuard {
    _file_guard: WorkerGuard,
}

/// Recording [`LogHooks`] for tests
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::LogHooks;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum LogLine {
        Info(String),
        Warn(String),
    }

    /// Keeps every message in order; clones share the same buffer
    #[derive(Clone, Default)]
    pub struct RecordingHooks {
        pub lines: Arc<Mutex<Vec<LogLine>>>,
    }

    impl RecordingHooks {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<LogLine> {
            self.lines.lock().unwrap().clone()
        }

        pub fn infos(&self) -> Vec<String> {
            self.lines()
                .into_iter()
                .filter_map(|l| match l {
                    LogLine::Info(m) => Some(m),
                    LogLine::Warn(_) => None,
                })
                .collect()
        }

        pub fn warnings(&self) -> Vec<String> {
            self.lines()
                .into_iter()
                .filter_map(|l| match l {
                    LogLine::Warn(m) => Some(m),
                    LogLine::Info(_) => None,
                })
                .collect()
        }
    }

    impl LogHooks for RecordingHooks {
        fn info(&self, message: &str) {
            self.lines.lock().unwrap().push(LogLine::Info(message.to_string()));
        }

        fn warn(&self, message: &str) {
            self.lines.lock().unwrap().push(LogLine::Warn(message.to_string()));
        }
    }
}
