//! Unit tests for the concurrent backup batch, driven by real directory tasks

use homelab_backup::managers::batch::BackupBatch;
use homelab_backup::strategies::DirectoryBackup;
use test_utils::{FileCall, MockFileOps, TaskError, TestContext};

#[tokio::test]
async fn test_batch_copies_every_directory() {
    let ctx = TestContext::new();
    ctx.create_file("src/a/one.txt", "1");
    ctx.create_file("src/b/two.txt", "2");
    let task_ctx = ctx.task_context();

    let mut batch = BackupBatch::new();
    for name in ["a", "b"] {
        batch.add(Box::new(DirectoryBackup::new(
            ctx.temp_dir().join("src").join(name),
            ctx.temp_dir().join("dst").join(name),
            &task_ctx,
        )));
    }

    let produced = batch.run_all().await.unwrap();

    assert_eq!(
        produced,
        vec![ctx.temp_dir().join("dst/a"), ctx.temp_dir().join("dst/b")]
    );
    assert_eq!(ctx.read_file("dst/a/one.txt").unwrap(), "1");
    assert_eq!(ctx.read_file("dst/b/two.txt").unwrap(), "2");
}

#[tokio::test]
async fn test_missing_sources_do_not_stop_other_tasks() {
    let ctx = TestContext::new();
    ctx.create_file("src/present/file.txt", "kept");
    let task_ctx = ctx.task_context();

    let mut batch = BackupBatch::new();
    for name in ["gone-1", "present", "gone-2"] {
        batch.add(Box::new(DirectoryBackup::new(
            ctx.temp_dir().join("src").join(name),
            ctx.temp_dir().join("dst").join(name),
            &task_ctx,
        )));
    }

    let err = batch.run_all().await.unwrap_err();

    assert_eq!(err.total(), 3);
    assert_eq!(err.failures().len(), 2);
    assert!(err.contains("gone-1"));
    assert!(err.contains("gone-2"));
    assert!(matches!(err.error_for("gone-1"), Some(TaskError::SourceNotFound(_))));
    assert_eq!(ctx.read_file("dst/present/file.txt").unwrap(), "kept");
}

#[tokio::test]
async fn test_failed_pre_command_skips_copy() {
    let ctx = TestContext::new().with_executor(test_utils::MockExecutor::failing(3));
    ctx.create_file("src/export/data.json", "{}");
    let task_ctx = ctx.task_context();

    let mut batch = BackupBatch::new();
    batch.add(Box::new(
        DirectoryBackup::new(
            ctx.temp_dir().join("src/export"),
            ctx.temp_dir().join("dst/export"),
            &task_ctx,
        )
        .with_pre_command("exporter --all"),
    ));

    let err = batch.run_all().await.unwrap_err();

    assert!(matches!(err.error_for("export"), Some(TaskError::PreCommand(_))));
    assert_eq!(ctx.executor.shell_commands(), vec!["exporter --all".to_string()]);
    assert!(!ctx.temp_dir().join("dst/export/data.json").exists());
}

#[tokio::test]
async fn test_empty_source_directory_is_copied() {
    let ctx = TestContext::new();
    let source = ctx.create_subdir("src/empty");
    let task_ctx = ctx.task_context();

    let mut batch = BackupBatch::new();
    batch.add(Box::new(DirectoryBackup::new(
        source,
        ctx.temp_dir().join("dst/empty"),
        &task_ctx,
    )));

    batch.run_all().await.unwrap();

    assert!(ctx.temp_dir().join("dst/empty").is_dir());
}

#[tokio::test]
async fn test_copy_failure_is_reported_per_task() {
    let ctx = TestContext::new().with_files(MockFileOps::new().with_failing_copy());
    let task_ctx = ctx.mocked_task_context();

    let mut batch = BackupBatch::new();
    for name in ["first", "second"] {
        batch.add(Box::new(DirectoryBackup::new(
            format!("/srv/{}", name),
            format!("/backup/{}", name),
            &task_ctx,
        )));
    }

    let err = batch.run_all().await.unwrap_err();

    assert_eq!(err.failures().len(), 2);
    for failure in &err {
        assert!(matches!(failure.error, TaskError::Copy(_)));
    }
    let copies = ctx
        .files
        .get_calls()
        .into_iter()
        .filter(|c| matches!(c, FileCall::CopyDir { .. }))
        .count();
    assert_eq!(copies, 2);
}
