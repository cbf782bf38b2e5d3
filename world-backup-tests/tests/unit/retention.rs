//! Count-based rotation

use rstest::rstest;
use std::time::Duration;
use test_utils::{MockRemover, RecordingHooks, RetentionPolicy, TestContext};
use world_backup::utils::retention::{list_backups, rotate, rotate_with};

#[rstest]
#[case(5, 3, 2)]
#[case(4, 1, 3)]
#[case(3, 3, 0)]
#[case(2, 5, 0)]
#[case(0, 2, 0)]
fn test_rotation_removes_the_oldest_excess(
    #[case] count: usize,
    #[case] limit: i64,
    #[case] expected_removed: usize,
) {
    let ctx = TestContext::new();
    let archives = ctx.create_archives(count);
    std::fs::create_dir_all(ctx.backup_dir()).unwrap();

    let removed = rotate(&ctx.backup_dir(), RetentionPolicy::new(limit), &RecordingHooks::new()).unwrap();

    assert_eq!(removed, archives[..expected_removed].to_vec());
    assert!(archives[..expected_removed].iter().all(|a| !a.exists()));
    assert!(archives[expected_removed..].iter().all(|a| a.exists()));
}

#[rstest]
#[case(0)]
#[case(-1)]
#[case(i64::MIN)]
fn test_non_positive_limit_keeps_everything(#[case] limit: i64) {
    let ctx = TestContext::new();
    ctx.create_archives(6);
    let remover = MockRemover::new();

    let removed = rotate_with(
        &ctx.backup_dir(),
        RetentionPolicy::new(limit),
        &RecordingHooks::new(),
        &remover,
    )
    .unwrap();

    assert!(removed.is_empty());
    assert!(remover.attempts().is_empty());
    assert_eq!(ctx.backup_dir_listing().len(), 6);
}

#[test]
fn test_disabled_rotation_does_not_read_the_directory() {
    let ctx = TestContext::new();
    let missing = ctx.temp_dir().join("never-created");

    let removed = rotate(&missing, RetentionPolicy::disabled(), &RecordingHooks::new()).unwrap();

    assert!(removed.is_empty());
}

#[test]
fn test_rotation_is_idempotent() {
    let ctx = TestContext::new();
    ctx.create_archives(5);
    let policy = RetentionPolicy::new(2);

    let first = rotate(&ctx.backup_dir(), policy, &RecordingHooks::new()).unwrap();
    let after_first = ctx.backup_dir_listing();
    let second = rotate(&ctx.backup_dir(), policy, &RecordingHooks::new()).unwrap();

    assert_eq!(first.len(), 3);
    assert!(second.is_empty());
    assert_eq!(ctx.backup_dir_listing(), after_first);
}

#[test]
fn test_five_archives_limit_three_keeps_the_newest() {
    let ctx = TestContext::new();
    let archives = ctx.create_archives(5);
    let hooks = RecordingHooks::new();

    rotate(&ctx.backup_dir(), RetentionPolicy::new(3), &hooks).unwrap();

    let kept: Vec<String> = archives[2..]
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(ctx.backup_dir_listing(), kept);
    assert_eq!(
        hooks.infos(),
        vec![
            "Deleting old backup: backup-2024-01-01_00-00-00.zip",
            "Deleting old backup: backup-2024-01-02_00-00-00.zip",
        ]
    );
}

#[test]
fn test_modification_time_wins_over_name() {
    let ctx = TestContext::new();
    // Name sorts first but the file is the newest
    let newest = ctx.create_archive_aged("backup-0000.zip", Duration::from_secs(10));
    let oldest = ctx.create_archive_aged("backup-9999.zip", Duration::from_secs(1000));

    let removed = rotate(&ctx.backup_dir(), RetentionPolicy::new(1), &RecordingHooks::new()).unwrap();

    assert_eq!(removed, vec![oldest]);
    assert!(newest.exists());
}

#[test]
fn test_non_matching_files_are_never_counted_or_removed() {
    let ctx = TestContext::new();
    ctx.create_archives(2);
    let notes = ctx.create_archive_aged("notes.zip", Duration::from_secs(99_999));
    let partial = ctx.create_archive_aged("backup-x.zip.partial", Duration::from_secs(99_999));

    let removed = rotate(&ctx.backup_dir(), RetentionPolicy::new(2), &RecordingHooks::new()).unwrap();

    assert!(removed.is_empty());
    assert!(notes.exists());
    assert!(partial.exists());
}

#[test]
fn test_failed_deletion_stops_rotation() {
    let ctx = TestContext::new();
    let archives = ctx.create_archives(4);
    let remover = MockRemover::deleting().failing_on(2);

    let err = rotate_with(
        &ctx.backup_dir(),
        RetentionPolicy::new(1),
        &RecordingHooks::new(),
        &remover,
    )
    .unwrap_err();

    assert!(err.to_string().contains("mock removal failure"));
    assert_eq!(remover.attempts(), archives[..2].to_vec());
    assert!(!archives[0].exists());
    assert!(archives[1].exists());
    assert!(archives[2].exists());
}

#[test]
fn test_list_backups_is_oldest_first() {
    let ctx = TestContext::new();
    let archives = ctx.create_archives(3);

    let records = list_backups(&ctx.backup_dir()).unwrap();

    let paths: Vec<_> = records.into_iter().map(|r| r.path).collect();
    assert_eq!(paths, archives);
}

#[test]
fn test_unreadable_root_is_a_rotation_error() {
    let ctx = TestContext::new();
    let missing = ctx.temp_dir().join("missing");

    let err = rotate(&missing, RetentionPolicy::new(1), &RecordingHooks::new()).unwrap_err();

    assert!(matches!(err, world_backup::BackupError::Rotation { .. }));
}
