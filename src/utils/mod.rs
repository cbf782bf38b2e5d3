pub mod archive;
pub mod paths;
pub mod retention;
pub mod walker;
pub mod worlds;

// Re-export commonly used types and traits (used by test crate)
pub use archive::ArchiveSummary;
pub use retention::{ArchiveRemover, BackupRecord, FsRemover, RetentionPolicy};
pub use walker::{EntryKind, WalkEntry, Walker};
