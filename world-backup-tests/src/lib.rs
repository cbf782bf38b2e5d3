//! Test utilities for world-backup
//!
//! This crate provides shared test utilities, fixtures and helper functions
//! for testing the world-backup engine.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{create_world, archive_names, TestContext};
//!
//! #[test]
//! fn my_test() {
//!     let ctx = TestContext::new();
//!     let world = create_world(ctx.temp_dir(), "world");
//!     // ... build an archive and inspect it with archive_names()
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::ConfigBuilder;
pub use fixtures::*;
pub use test_context::{OptionAssertions, ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use world_backup::config::{BackupSettings, Config, GlobalConfig};
pub use world_backup::managers::logging::mock::{LogLine, RecordingHooks};
pub use world_backup::utils::retention::mock::MockRemover;
pub use world_backup::utils::{BackupRecord, RetentionPolicy};

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
