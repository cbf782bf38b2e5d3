//! Tests for listing archives

use std::time::Duration;
use test_utils::{RecordingHooks, TestContext};
use world_backup::BackupManager;

#[test]
fn test_list_missing_backup_dir_is_empty() {
    let ctx = TestContext::new();
    let manager = BackupManager::new(ctx.settings::<&str>(&[], 0));

    assert!(manager.list_backups().unwrap().is_empty());
    assert!(!ctx.backup_dir().exists());
}

#[test]
fn test_list_is_oldest_first_with_sizes() {
    let ctx = TestContext::new();
    let archives = ctx.create_archives(3);
    ctx.create_archive_aged("readme.txt", Duration::from_secs(5));
    let manager = BackupManager::new(ctx.settings::<&str>(&[], 0));

    let records = manager.list_backups().unwrap();

    let paths: Vec<_> = records.iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, archives);
    assert!(records.iter().all(|r| r.size == r.name.len() as u64));
}

#[test]
fn test_list_includes_archive_from_run() {
    let ctx = TestContext::new();
    let world = ctx.create_world("world");
    let manager = BackupManager::new(ctx.settings(&[&world], 0)).with_hooks(RecordingHooks::new());

    manager.run().unwrap();
    let records = manager.list_backups().unwrap();

    assert_eq!(records.len(), 1);
    assert!(records[0].name.starts_with("backup-"));
    assert!(records[0].name.ends_with(".zip"));
    assert!(records[0].size > 0);
}
