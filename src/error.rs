//! Error types for the backup engine
//!
//! Directory and archive failures are fatal to a backup run. Rotation
//! failures are produced by the retention code but absorbed by the
//! orchestrator, which logs them as warnings.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Backup root could not be created or is not writable
    #[error("Backup directory {path:?} is not usable ({stage}): {source}")]
    Directory {
        path: PathBuf,
        stage: DirectoryStage,
        #[source]
        source: std::io::Error,
    },

    /// Anything that went wrong while producing the archive container
    #[error("Failed to create archive {archive:?} at {path:?}: {source}")]
    ArchiveCreation {
        archive: PathBuf,
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Listing or deleting during retention
    #[error("Failed to rotate backups at {path:?}: {source}")]
    Rotation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which step of the writability probe failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryStage {
    Create,
    ProbeWrite,
    ProbeRemove,
}

impl std::fmt::Display for DirectoryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            DirectoryStage::Create => "failed to create directory",
            DirectoryStage::ProbeWrite => "directory is not writable",
            DirectoryStage::ProbeRemove => "failed to clean up probe file",
        };
        f.write_str(text)
    }
}

impl BackupError {
    pub(crate) fn archive(
        archive: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
        source: impl Into<zip::result::ZipError>,
    ) -> Self {
        BackupError::ArchiveCreation {
            archive: archive.into(),
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn rotation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BackupError::Rotation {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
