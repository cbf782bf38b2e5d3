//! Command tests for world-backup
//!
//! These tests drive `BackupManager` the way the binary's subcommands do,
//! with recording hooks and mock removers where a failure has to be staged.

mod list;
mod run;
