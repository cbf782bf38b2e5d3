//! Count-based retention over `backup-*.zip` archives
//!
//! Records are re-read from the backup root on every call; nothing is cached
//! between invocations.

use crate::error::{BackupError, Result};
use crate::managers::logging::LogHooks;
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const BACKUP_PREFIX: &str = "backup-";
pub const BACKUP_EXTENSION: &str = ".zip";

/// chrono format of the timestamp embedded in archive names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `backup-<YYYY-MM-DD_HH-MM-SS>.zip` for the given local time
pub fn backup_file_name(at: &DateTime<Local>) -> String {
    format!("{}{}{}", BACKUP_PREFIX, at.format(TIMESTAMP_FORMAT), BACKUP_EXTENSION)
}

/// Matches the `backup-*.zip` pattern
pub fn is_backup_name(name: &str) -> bool {
    name.len() >= BACKUP_PREFIX.len() + BACKUP_EXTENSION.len()
        && name.starts_with(BACKUP_PREFIX)
        && name.ends_with(BACKUP_EXTENSION)
}

/// Maximum number of archives to keep; zero or negative disables rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub limit: i64,
}

impl RetentionPolicy {
    pub fn new(limit: i64) -> Self {
        Self { limit }
    }

    pub fn disabled() -> Self {
        Self { limit: 0 }
    }

    pub fn is_disabled(&self) -> bool {
        self.limit <= 0
    }

    /// How many of `count` archives have to go
    pub fn excess(&self, count: usize) -> usize {
        if self.is_disabled() {
            return 0;
        }
        let keep = usize::try_from(self.limit).unwrap_or(usize::MAX);
        count.saturating_sub(keep)
    }
}

/// A finished archive found in the backup root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

/// List archives directly under `root`, oldest first.
///
/// Ordering is modification time, then name, so archives sharing a
/// timestamp always rotate in the same order. Entries that vanish while
/// being listed are skipped.
pub fn list_backups(root: &Path) -> Result<Vec<BackupRecord>> {
    let entries = fs::read_dir(root).map_err(|e| BackupError::rotation(root, e))?;

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BackupError::rotation(root, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_backup_name(&name) {
            continue;
        }

        let file_type = entry
            .file_type()
            .map_err(|e| BackupError::rotation(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(_) => continue,
        };
        let modified = metadata
            .modified()
            .map_err(|e| BackupError::rotation(entry.path(), e))?;

        records.push(BackupRecord {
            path: entry.path(),
            size: metadata.len(),
            modified,
            name,
        });
    }

    records.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));
    Ok(records)
}

/// Deletes archive files on behalf of rotation
pub trait ArchiveRemover {
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Removes archives from the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl ArchiveRemover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Delete the oldest archives under `root` until at most `policy.limit`
/// remain. Returns the paths that were removed.
pub fn rotate(root: &Path, policy: RetentionPolicy, hooks: &dyn LogHooks) -> Result<Vec<PathBuf>> {
    rotate_with(root, policy, hooks, &FsRemover)
}

/// [`rotate`] with a caller-supplied remover. Stops at the first failed
/// deletion; surplus archives after it are left in place.
pub fn rotate_with(
    root: &Path,
    policy: RetentionPolicy,
    hooks: &dyn LogHooks,
    remover: &dyn ArchiveRemover,
) -> Result<Vec<PathBuf>> {
    if policy.is_disabled() {
        return Ok(Vec::new());
    }

    let records = list_backups(root)?;
    let excess = policy.excess(records.len());
    if excess == 0 {
        return Ok(Vec::new());
    }

    let mut removed = Vec::with_capacity(excess);
    for record in records.into_iter().take(excess) {
        hooks.info(&format!("Deleting old backup: {}", record.name));
        remover
            .remove(&record.path)
            .map_err(|e| BackupError::rotation(&record.path, e))?;
        removed.push(record.path);
    }

    Ok(removed)
}

/// Test doubles for [`ArchiveRemover`]
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every removal attempt and can be told to fail on the Nth one
    #[derive(Clone, Default)]
    pub struct MockRemover {
        pub attempts: Arc<Mutex<Vec<PathBuf>>>,
        fail_on_attempt: Option<usize>,
        delete_files: bool,
    }

    impl MockRemover {
        /// Records attempts without touching the filesystem
        pub fn new() -> Self {
            Self::default()
        }

        /// Records attempts and really deletes the files
        pub fn deleting() -> Self {
            Self {
                delete_files: true,
                ..Self::default()
            }
        }

        /// Fail the given attempt (1-based) with a permission error
        pub fn failing_on(mut self, attempt: usize) -> Self {
            self.fail_on_attempt = Some(attempt);
            self
        }

        pub fn attempts(&self) -> Vec<PathBuf> {
            self.attempts.lock().unwrap().clone()
        }
    }

    impl ArchiveRemover for MockRemover {
        fn remove(&self, path: &Path) -> io::Result<()> {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(path.to_path_buf());

            if self.fail_on_attempt == Some(attempts.len()) {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "mock removal failure",
                ));
            }

            if self.delete_files {
                fs::remove_file(path)?;
            }
            Ok(())
        }
    }
}
