//! Local backup workflow

use homelab_backup::managers::batch::BatchError;
use homelab_backup::managers::local::{LocalBackupError, LocalBackupManager};
use homelab_backup::config::PAPERLESS_EXPORT_COMMAND;
use std::fs;
use test_utils::{
    BackupTask, EnvBuilder, MockContainerOps, OptionAssertions, TaskError, TestContext,
};

fn tasks_error(err: LocalBackupError) -> BatchError {
    match err {
        LocalBackupError::Tasks(batch) => batch,
        other => panic!("expected task failures, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_local_backup() {
    let env = EnvBuilder::new();
    let ctx = TestContext::new();
    let plan = env.plan();
    let root = env.backup_root();

    let produced = LocalBackupManager::new(plan, ctx.task_context())
        .with_lock_path(env.lock_path())
        .run()
        .await
        .unwrap();

    assert_eq!(
        produced,
        vec![
            root.join("calibre-web-automated-calibre-library"),
            root.join("calibre-web-automated-config"),
            root.join("paperless-ngx-webserver-export"),
            root.join("immich-db/immich.sql"),
            root.join("immich-library"),
            root.join("firefly-db/firefly.sql"),
        ]
    );

    let library = root.join("calibre-web-automated-calibre-library");
    assert!(library.join("metadata.db").is_file());
    assert!(library.join("Iain M. Banks/Excession (7)/book.epub").is_file());
    assert!(root.join("calibre-web-automated-config/app.db").is_file());
    assert!(root.join("paperless-ngx-webserver-export/manifest.json").is_file());
    assert!(root.join("immich-library/library/admin/IMG_0001.jpg").is_file());
    assert!(root.join("immich-db").is_dir());
    assert!(root.join("firefly-db").is_dir());

    assert_eq!(
        ctx.executor.shell_commands(),
        vec![PAPERLESS_EXPORT_COMMAND.to_string()]
    );

    let mut containers: Vec<_> = ctx
        .containers
        .exec_commands()
        .into_iter()
        .map(|(container, _)| container)
        .collect();
    containers.sort();
    assert_eq!(containers, vec!["firefly_db", "immich_postgres"]);
}

#[tokio::test]
async fn test_stale_backup_content_is_removed() {
    let env = EnvBuilder::new();
    let ctx = TestContext::new();
    let root = env.backup_root();
    fs::create_dir_all(root.join("retired-service")).unwrap();
    fs::write(root.join("retired-service/old.tar"), "old").unwrap();

    LocalBackupManager::new(env.plan(), ctx.task_context())
        .with_lock_path(env.lock_path())
        .run()
        .await
        .unwrap();

    assert!(!root.join("retired-service").exists());
    assert!(root.join("immich-library").is_dir());
}

#[tokio::test]
async fn test_missing_source_fails_only_its_task() {
    let env = EnvBuilder::new();
    fs::remove_dir_all(env.source("calibre-config")).unwrap();
    let ctx = TestContext::new();

    let err = LocalBackupManager::new(env.plan(), ctx.task_context())
        .with_lock_path(env.lock_path())
        .run()
        .await
        .unwrap_err();

    let batch = tasks_error(err);
    assert_eq!(batch.failures().len(), 1);
    assert!(batch.contains("calibre-web-automated-config"));
    assert!(batch.to_string().contains("calibre-web-automated-config"));
    assert!(matches!(
        batch.error_for("calibre-web-automated-config").assert_some(),
        TaskError::SourceNotFound(_)
    ));

    // The other tasks still ran
    let root = env.backup_root();
    assert!(root.join("immich-library/library/admin/IMG_0001.jpg").is_file());
    assert_eq!(ctx.containers.exec_commands().len(), 2);
}

#[tokio::test]
async fn test_unready_databases_are_reported_together() {
    let env = EnvBuilder::new();
    let ctx = TestContext::new().with_containers(MockContainerOps::new().with_never_ready());

    let err = LocalBackupManager::new(env.plan(), ctx.task_context())
        .with_lock_path(env.lock_path())
        .run()
        .await
        .unwrap_err();

    let batch = tasks_error(err);
    assert_eq!(batch.total(), 6);
    assert_eq!(batch.failures().len(), 2);
    assert!(batch.contains("immich-db"));
    assert!(batch.contains("firefly-db"));
    assert!(env.backup_root().join("immich-library").is_dir());

    let report = batch.to_string();
    assert!(report.contains(
        "immich-db: database never became ready: too many retries: `pg_isready -q` \
         did not succeed in container immich_postgres after 30 attempts"
    ));
    assert!(report.contains("firefly-db: database never became ready: too many retries"));
}

#[test]
fn test_failed_dump_leaves_no_partial_file() {
    let env = EnvBuilder::new();
    let ctx = TestContext::new().with_containers(MockContainerOps::new().with_failing_exec(1));
    // Stands in for the file the host redirection creates before the dump fails
    let partial = env.backup_root().join("immich-db/immich.sql");
    let task_ctx = ctx.task_context();
    let plan = env.plan();
    let immich = plan.tasks.iter().find(|t| t.name == "immich-db").unwrap();
    let task = homelab_backup::build_task(immich, &task_ctx);
    fs::create_dir_all(partial.parent().unwrap()).unwrap();
    fs::write(&partial, "-- truncated").unwrap();

    let err = task.run().unwrap_err();

    assert!(matches!(err, TaskError::Dump { .. }));
    assert!(!partial.exists());
    assert!(partial.parent().unwrap().is_dir());
}
