//! Tests for a full backup run

use chrono::{DateTime, Local, TimeZone};
use std::fs;
use test_utils::{
    archive_entry_bytes, archive_names, LogLine, MockRemover, RecordingHooks, TestContext,
    WORLD_FILES,
};
use world_backup::utils::walker::normalize;
use world_backup::{BackupError, BackupManager, BackupOutcome, BackupReport};

fn at(day: u32, second: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, day, 3, 0, second).unwrap()
}

fn expect_created(outcome: BackupOutcome) -> BackupReport {
    match outcome {
        BackupOutcome::Created(report) => report,
        BackupOutcome::NothingToBackUp => panic!("expected an archive to be created"),
    }
}

#[test]
fn test_run_archives_all_existing_worlds() {
    let ctx = TestContext::new();
    let overworld = ctx.create_world("world");
    let nether = ctx.create_world("world_nether");
    let missing = ctx.temp_dir().join("world_the_end");
    let hooks = RecordingHooks::new();
    let manager = BackupManager::new(ctx.settings(&[&overworld, &nether, &missing], 0))
        .with_hooks(hooks.clone());

    let report = expect_created(manager.run_at(at(1, 0)).unwrap());

    assert_eq!(report.summary.files, WORLD_FILES.len() * 2);
    let names = archive_names(&report.archive);
    assert_eq!(names[0], format!("{}/", normalize(&overworld)));
    assert!(names.contains(&format!("{}/", normalize(&nether))));
    assert!(!names.iter().any(|n| n.contains("world_the_end")));

    let level = normalize(&nether.join("level.dat"));
    assert_eq!(archive_entry_bytes(&report.archive, &level), b"level-data".to_vec());
}

#[test]
fn test_run_logs_in_order() {
    let ctx = TestContext::new();
    let world = ctx.create_world("world");
    let hooks = RecordingHooks::new();
    let manager = BackupManager::new(ctx.settings(&[&world], 0)).with_hooks(hooks.clone());

    let report = expect_created(manager.run_at(at(2, 0)).unwrap());

    let lines = hooks.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        LogLine::Info(format!("Creating backup: {}", report.archive.display()))
    );
    assert!(matches!(&lines[1], LogLine::Info(m) if m.starts_with("Backup created successfully: ")));
}

#[test]
fn test_run_without_worlds_writes_nothing() {
    let ctx = TestContext::new();
    let hooks = RecordingHooks::new();
    let manager = BackupManager::new(ctx.settings(&[&ctx.temp_dir().join("world")], 2))
        .with_hooks(hooks.clone());

    assert_eq!(manager.run_at(at(3, 0)).unwrap(), BackupOutcome::NothingToBackUp);
    assert!(ctx.backup_dir_listing().is_empty());
    assert_eq!(hooks.infos(), vec!["No worlds found to backup, skipping"]);
}

#[test]
fn test_run_applies_retention_after_archiving() {
    let ctx = TestContext::new();
    let world = ctx.create_world("world");
    let old = ctx.create_archives(3);
    let manager = BackupManager::new(ctx.settings(&[&world], 2)).with_hooks(RecordingHooks::new());

    let report = expect_created(manager.run_at(at(4, 0)).unwrap());

    assert_eq!(report.removed, old[..2].to_vec());
    let names = ctx.backup_dir_listing();
    assert_eq!(names.len(), 2);
    assert!(report.archive.exists());
    assert!(old[2].exists());
}

#[test]
fn test_new_archive_counts_toward_the_limit() {
    let ctx = TestContext::new();
    let world = ctx.create_world("world");
    let manager = BackupManager::new(ctx.settings(&[&world], 1)).with_hooks(RecordingHooks::new());

    let first = expect_created(manager.run_at(at(5, 0)).unwrap());
    let second = expect_created(manager.run_at(at(5, 1)).unwrap());

    assert!(!first.archive.exists());
    assert!(second.archive.exists());
    assert_eq!(ctx.backup_dir_listing().len(), 1);
}

#[test]
fn test_rotation_failure_is_only_a_warning() {
    let ctx = TestContext::new();
    let world = ctx.create_world("world");
    ctx.create_archives(2);
    let hooks = RecordingHooks::new();
    let manager = BackupManager::new(ctx.settings(&[&world], 1))
        .with_hooks(hooks.clone())
        .with_remover(MockRemover::new().failing_on(1));

    let report = expect_created(manager.run_at(at(6, 0)).unwrap());

    assert!(report.archive.is_file());
    assert!(report.removed.is_empty());
    let warning = report.rotation_warning.unwrap();
    assert!(warning.starts_with("Failed to rotate backups: "));
    assert_eq!(hooks.warnings(), vec![warning]);
    assert_eq!(ctx.backup_dir_listing().len(), 3);
}

#[test]
fn test_unusable_backup_root_fails_before_archiving() {
    let ctx = TestContext::new();
    let world = ctx.create_world("world");
    ctx.create_file("backups", "occupied");
    let hooks = RecordingHooks::new();
    let manager = BackupManager::new(ctx.settings(&[&world], 1)).with_hooks(hooks.clone());

    let err = manager.run_at(at(7, 0)).unwrap_err();

    assert!(matches!(err, BackupError::Directory { .. }));
    assert!(hooks.lines().is_empty());
}

#[test]
fn test_same_second_runs_share_one_archive() {
    let ctx = TestContext::new();
    let world = ctx.create_world("world");
    let manager = BackupManager::new(ctx.settings(&[&world], 0)).with_hooks(RecordingHooks::new());

    let first = expect_created(manager.run_at(at(8, 0)).unwrap());
    fs::write(world.join("level.dat"), b"changed").unwrap();
    let second = expect_created(manager.run_at(at(8, 0)).unwrap());

    assert_eq!(first.archive, second.archive);
    assert_eq!(ctx.backup_dir_listing().len(), 1);
    let level = normalize(&world.join("level.dat"));
    assert_eq!(archive_entry_bytes(&second.archive, &level), b"changed".to_vec());
}

#[test]
fn test_run_with_repeated_world_succeeds() {
    let ctx = TestContext::new();
    let world = ctx.create_world("world");
    let manager = BackupManager::new(ctx.settings(&[&world, &world], 0)).with_hooks(RecordingHooks::new());

    let report = expect_created(manager.run_at(at(9, 0)).unwrap());

    assert_eq!(report.summary.files, WORLD_FILES.len());
    assert!(report.summary.duplicates > 0);
    assert!(report.archive.is_file());
}
