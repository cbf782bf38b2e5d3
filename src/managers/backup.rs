//! Backup manager - orchestrates one backup invocation
//!
//! validate root -> filter worlds -> build archive -> rotate
//!
//! Directory and archive failures end the run with an error. A rotation
//! failure after a successful archive is reported through the warn hook and
//! the run still succeeds.

use crate::config::{expand_tilde, BackupSettings};
use crate::error::Result;
use crate::managers::logging::{LogHooks, TracingHooks};
use crate::utils::archive::{self, ArchiveSummary};
use crate::utils::retention::{self, ArchiveRemover, BackupRecord, FsRemover};
use crate::utils::{paths, worlds};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Result of a successful invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// None of the configured worlds exist; no archive was written
    NothingToBackUp,
    Created(BackupReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    pub archive: PathBuf,
    pub summary: ArchiveSummary,
    /// Archives deleted by rotation, oldest first
    pub removed: Vec<PathBuf>,
    /// Set when rotation failed; the archive itself is still committed
    pub rotation_warning: Option<String>,
}

pub struct BackupManager {
    settings: BackupSettings,
    hooks: Box<dyn LogHooks>,
    remover: Box<dyn ArchiveRemover>,
}

impl BackupManager {
    /// Create new backup manager logging through `tracing`
    pub fn new(mut settings: BackupSettings) -> Self {
        settings.directory = expand_tilde(&settings.directory);
        Self {
            settings,
            hooks: Box::new(TracingHooks),
            remover: Box::new(FsRemover),
        }
    }

    /// Replace the progress sink
    pub fn with_hooks(mut self, hooks: impl LogHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Replace how rotation deletes archives
    pub fn with_remover(mut self, remover: impl ArchiveRemover + 'static) -> Self {
        self.remover = Box::new(remover);
        self
    }

    pub fn settings(&self) -> &BackupSettings {
        &self.settings
    }

    pub fn backup_dir(&self) -> &Path {
        &self.settings.directory
    }

    /// Run a backup stamped with the current local time
    pub fn run(&self) -> Result<BackupOutcome> {
        self.run_at(Local::now())
    }

    /// Run a backup whose archive name is derived from `now`
    pub fn run_at(&self, now: DateTime<Local>) -> Result<BackupOutcome> {
        let root = self.backup_dir();
        paths::ensure_usable(root)?;

        let existing = worlds::filter_existing(self.settings.worlds.iter().map(PathBuf::from));
        if existing.is_empty() {
            self.hooks.info("No worlds found to backup, skipping");
            return Ok(BackupOutcome::NothingToBackUp);
        }

        let archive_path = root.join(retention::backup_file_name(&now));
        self.hooks
            .info(&format!("Creating backup: {}", archive_path.display()));

        let summary = archive::build(&archive_path, &existing)?;
        self.hooks.info(&format!(
            "Backup created successfully: {} ({})",
            archive_path.display(),
            summary
        ));

        let (removed, rotation_warning) = match self.rotate() {
            Ok(removed) => (removed, None),
            Err(e) => {
                let message = format!("Failed to rotate backups: {}", e);
                self.hooks.warn(&message);
                (Vec::new(), Some(message))
            }
        };

        Ok(BackupOutcome::Created(BackupReport {
            archive: archive_path,
            summary,
            removed,
            rotation_warning,
        }))
    }

    /// Apply the retention policy on its own. Errors are returned, not logged.
    pub fn rotate(&self) -> Result<Vec<PathBuf>> {
        retention::rotate_with(
            self.backup_dir(),
            self.settings.retention(),
            self.hooks.as_ref(),
            self.remover.as_ref(),
        )
    }

    /// Archives currently in the backup directory, oldest first.
    /// A backup directory that does not exist yet holds no archives.
    pub fn list_backups(&self) -> Result<Vec<BackupRecord>> {
        if !self.backup_dir().exists() {
            return Ok(Vec::new());
        }
        retention::list_backups(self.backup_dir())
    }
}
