//! Test context and harness for integration testing
//!
//! Provides a unified context for setting up and tearing down test environments.

use crate::fixtures;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use world_backup::config::BackupSettings;

/// Test context that manages test resources and provides common utilities
pub struct TestContext {
    /// Temporary directory for test files
    temp_dir: TempDir,
}

impl TestContext {
    /// Create a new test context with a temporary directory
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the temporary directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Default backup root inside the temp dir (not created)
    pub fn backup_dir(&self) -> PathBuf {
        self.temp_dir.path().join("backups")
    }

    /// Create a subdirectory in the temp dir
    pub fn create_subdir(&self, name: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::create_dir_all(&path).expect("Failed to create subdirectory");
        path
    }

    /// Create a file in the temp dir
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fixtures::write_file(&path, content.as_bytes());
        path
    }

    /// Create a fixture world (see [`fixtures::create_world`])
    pub fn create_world(&self, name: &str) -> PathBuf {
        fixtures::create_world(self.temp_dir.path(), name)
    }

    /// Create `backup_dir()/name` with its modification time `age` in the past
    pub fn create_archive_aged(&self, name: &str, age: Duration) -> PathBuf {
        let dir = self.backup_dir();
        fs::create_dir_all(&dir).expect("Failed to create backup dir");
        let path = dir.join(name);
        fs::write(&path, name.as_bytes()).expect("Failed to write archive");
        set_modified(&path, SystemTime::now() - age);
        path
    }

    /// Create `count` archives with strictly increasing modification times.
    /// Returned oldest first.
    pub fn create_archives(&self, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let age = Duration::from_secs(3600 * (count - i) as u64);
                self.create_archive_aged(&format!("backup-2024-01-{:02}_00-00-00.zip", i + 1), age)
            })
            .collect()
    }

    /// Backup settings pointing at `backup_dir()`
    pub fn settings<P: AsRef<Path>>(&self, worlds: &[P], retention_count: i64) -> BackupSettings {
        BackupSettings {
            directory: self.backup_dir(),
            retention_count,
            worlds: worlds.iter().map(|w| w.as_ref().display().to_string()).collect(),
        }
    }

    /// Names of the entries directly under `backup_dir()`, sorted
    pub fn backup_dir_listing(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.backup_dir())
            .expect("Failed to read backup dir")
            .map(|e| e.expect("Failed to read entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Check if a file exists in the temp directory
    pub fn file_exists(&self, name: &str) -> bool {
        self.temp_dir.path().join(name).exists()
    }

    /// Read a file from the temp directory
    pub fn read_file(&self, name: &str) -> Result<String> {
        let path = self.temp_dir.path().join(name);
        Ok(fs::read_to_string(path)?)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Set a file's modification time
pub fn set_modified(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(time))
        .expect("Failed to set modification time");
}

/// Extension trait for assertion helpers
pub trait ResultAssertions<T> {
    /// Assert that the result is Ok and return the value
    fn assert_ok(self) -> T;

    /// Assert that the result is Err
    fn assert_err(self);

    /// Assert that the result is Err and the error message contains the given string
    fn assert_err_contains(self, needle: &str);
}

impl<T: std::fmt::Debug, E: std::fmt::Display> ResultAssertions<T> for std::result::Result<T, E> {
    fn assert_ok(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {}", e),
        }
    }

    fn assert_err(self) {
        if let Ok(v) = self {
            panic!("Expected Err, got Ok: {:?}", v);
        }
    }

    fn assert_err_contains(self, needle: &str) {
        match self {
            Ok(v) => panic!("Expected Err containing '{}', got Ok: {:?}", needle, v),
            Err(e) => {
                let err_msg = e.to_string();
                assert!(
                    err_msg.contains(needle),
                    "Error '{}' does not contain '{}'",
                    err_msg,
                    needle
                );
            }
        }
    }
}

/// Extension trait for Option assertions
pub trait OptionAssertions<T> {
    /// Assert that the option is Some and return the value
    fn assert_some(self) -> T;

    /// Assert that the option is None
    fn assert_none(self);
}

impl<T: std::fmt::Debug> OptionAssertions<T> for Option<T> {
    fn assert_some(self) -> T {
        match self {
            Some(v) => v,
            None => panic!("Expected Some, got None"),
        }
    }

    fn assert_none(self) {
        if let Some(v) = self {
            panic!("Expected None, got Some: {:?}", v);
        }
    }
}
