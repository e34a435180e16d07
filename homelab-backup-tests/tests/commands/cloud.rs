//! Cloud backup workflow

use homelab_backup::managers::cloud::{CloudBackup, CloudBackupError, AUTOMATIC_TAG_PREFIX};
use homelab_backup::utils::restic_ops::{RealResticOps, ResticEnv};
use homelab_backup::utils::RealFileOps;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use test_utils::{
    EnvBuilder, MockExecutor, MockFileOps, MockResponse, MockResticOps, ResticCall,
    SAMPLE_PASSPHRASE,
};

fn with_local_backup(env: &EnvBuilder) {
    fs::create_dir_all(env.backup_root().join("immich-db")).unwrap();
    fs::write(env.backup_root().join("immich-db/immich.sql"), "-- dump").unwrap();
}

#[test]
fn test_full_backup_with_mocked_restic() {
    let env = EnvBuilder::new();
    with_local_backup(&env);
    let restic = MockResticOps::new();
    let cloud = CloudBackup::with_ops(
        env.repository(),
        Arc::new(restic.clone()),
        Arc::new(RealFileOps::new()),
    );

    cloud.run_full_backup().unwrap();

    let calls = restic.get_calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], ResticCall::Init);
    match &calls[1] {
        ResticCall::Backup { path, tags } => {
            assert_eq!(path, &env.backup_root());
            assert_eq!(tags.len(), 1);
            assert!(tags[0].starts_with(AUTOMATIC_TAG_PREFIX));
        }
        other => panic!("expected backup, got {:?}", other),
    }
    assert_eq!(
        calls[2],
        ResticCall::Forget {
            keep_within: "30d".to_string(),
            prune: true,
        }
    );
}

#[test]
fn test_failed_backup_keeps_old_snapshots() {
    let env = EnvBuilder::new();
    with_local_backup(&env);
    let restic = MockResticOps::new().with_failing_backup();
    let cloud = CloudBackup::with_ops(
        env.repository(),
        Arc::new(restic.clone()),
        Arc::new(RealFileOps::new()),
    );

    let err = cloud.run_full_backup().unwrap_err();

    assert!(matches!(err, CloudBackupError::Backup(_)));
    assert!(!restic
        .get_calls()
        .iter()
        .any(|c| matches!(c, ResticCall::Forget { .. })));
}

#[test]
fn test_missing_local_backup_is_never_uploaded() {
    let env = EnvBuilder::new();
    let restic = MockResticOps::new();
    let cloud = CloudBackup::with_ops(
        env.repository(),
        Arc::new(restic.clone()),
        Arc::new(RealFileOps::new()),
    );

    let err = cloud.run_full_backup().unwrap_err();

    assert!(matches!(err, CloudBackupError::SourceDir { .. }));
    assert_eq!(restic.get_calls(), vec![ResticCall::Init]);
}

#[test]
fn test_full_backup_restic_command_lines() {
    let env = EnvBuilder::new().with_var("HOMELAB_BACKUP_RETENTION_DAYS", "7");
    with_local_backup(&env);
    let repository = env.repository();
    let executor = MockExecutor::new();
    let restic = RealResticOps::with_executor(
        ResticEnv::from_config(&repository),
        Arc::new(executor.clone()),
    );
    let cloud = CloudBackup::with_ops(repository, Arc::new(restic), Arc::new(RealFileOps::new()));

    cloud.run_full_backup().unwrap();

    let commands = executor.shell_commands();
    assert_eq!(commands.len(), 3);
    assert!(commands[0].ends_with(" restic snapshots"));
    let backup_tail = format!(
        " restic backup '{}' --verbose --tag '{}",
        env.backup_root().display(),
        AUTOMATIC_TAG_PREFIX
    );
    assert!(commands[1].contains(&backup_tail), "unexpected: {}", commands[1]);
    assert!(commands[2].ends_with(" restic forget --keep-within '7d' --prune"));
    for command in &commands {
        assert!(command.starts_with("RESTIC_REPOSITORY="));
        assert!(command.contains(&format!("RESTIC_PASSWORD='{}'", SAMPLE_PASSPHRASE)));
    }
}

#[test]
fn test_new_repository_is_created_before_backup() {
    let env = EnvBuilder::new();
    with_local_backup(&env);
    let repository = env.repository();
    let executor = MockExecutor::new().with_responses([MockResponse::Failure { exit_code: 10 }]);
    let restic = RealResticOps::with_executor(
        ResticEnv::from_config(&repository),
        Arc::new(executor.clone()),
    );
    let cloud = CloudBackup::with_ops(repository, Arc::new(restic), Arc::new(RealFileOps::new()));

    cloud.run_full_backup().unwrap();

    let commands = executor.shell_commands();
    assert_eq!(commands.len(), 4);
    assert!(commands[0].ends_with(" restic snapshots"));
    assert!(commands[1].ends_with(" restic init"));
}

#[test]
fn test_restore_creates_target() {
    let env = EnvBuilder::new();
    let restic = MockResticOps::new();
    let cloud = CloudBackup::with_ops(
        env.repository(),
        Arc::new(restic.clone()),
        Arc::new(RealFileOps::new()),
    );
    let target = env.temp_dir().join("restore/here");

    cloud.restore(&target).unwrap();

    assert!(target.is_dir());
    assert_eq!(restic.get_calls(), vec![ResticCall::Restore { target }]);
}

#[test]
fn test_standalone_failures_name_their_phase() {
    let env = EnvBuilder::new();
    let cloud_with = |restic: MockResticOps| {
        CloudBackup::with_ops(env.repository(), Arc::new(restic), Arc::new(RealFileOps::new()))
    };

    assert!(matches!(
        cloud_with(MockResticOps::new().with_failing_check()).check(),
        Err(CloudBackupError::Check(_))
    ));
    assert!(matches!(
        cloud_with(MockResticOps::new().with_failing_snapshots()).list_snapshots(),
        Err(CloudBackupError::ListSnapshots(_))
    ));
    assert!(matches!(
        cloud_with(MockResticOps::new().with_failing_forget()).prune(),
        Err(CloudBackupError::Prune(_))
    ));
    assert!(matches!(
        cloud_with(MockResticOps::new().with_failing_restore()).restore(env.temp_dir()),
        Err(CloudBackupError::Restore(_))
    ));
}

#[test]
fn test_unresolvable_restore_target_skips_restic() {
    let env = EnvBuilder::new();
    let restic = MockResticOps::new();
    let files = MockFileOps::new().with_failing_absolute();
    let cloud = CloudBackup::with_ops(env.repository(), Arc::new(restic.clone()), Arc::new(files));

    let err = cloud.restore(Path::new("restore")).unwrap_err();

    assert!(matches!(err, CloudBackupError::RestoreTarget { .. }));
    assert!(restic.get_calls().is_empty());
}
