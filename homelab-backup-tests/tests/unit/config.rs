//! Unit tests for configuration loading

use homelab_backup::config::{
    ConfigError, Env, LocalBackupPlan, RepositoryConfig, SystemEnv, TaskSource,
    PAPERLESS_EXPORT_COMMAND, VAR_RETENTION_DAYS,
};
use rstest::rstest;
use serial_test::serial;
use test_utils::{DatabaseEngine, EnvBuilder, SAMPLE_PASSPHRASE};

#[rstest]
#[case("HOMELAB_BACKUP_PATH")]
#[case("HOMELAB_CALIBRE_LIBRARY_PATH")]
#[case("HOMELAB_CALIBRE_CONF_PATH")]
#[case("HOMELAB_PAPERLESS_WEB_EXPORT_PATH")]
#[case("HOMELAB_IMMICH_DB_CONTAINER_NAME")]
#[case("HOMELAB_IMMICH_DB_DATABASE")]
#[case("HOMELAB_IMMICH_DB_USER")]
#[case("HOMELAB_IMMICH_DB_PASSWORD")]
#[case("HOMELAB_IMMICH_WEB_UPLOAD_PATH")]
#[case("HOMELAB_FIREFLY_DB_CONTAINER_NAME")]
#[case("HOMELAB_FIREFLY_DB_DATABASE")]
#[case("HOMELAB_FIREFLY_DB_USER")]
#[case("HOMELAB_FIREFLY_DB_PASSWORD")]
fn test_every_plan_variable_is_required(#[case] var: &str) {
    let builder = EnvBuilder::new().without(var);

    match LocalBackupPlan::from_env(builder.env()) {
        Err(ConfigError::MissingVar(name)) => assert_eq!(name, var),
        other => panic!("expected {} to be missing, got {:?}", var, other),
    }
}

#[rstest]
#[case("HOMELAB_BACKUP_RESTIC_REPOSITORY")]
#[case("HOMELAB_BACKUP_B2_ACCOUNT_ID")]
#[case("HOMELAB_BACKUP_B2_ACCOUNT_KEY")]
#[case("HOMELAB_BACKUP_RESTIC_PASSWORD")]
#[case("HOMELAB_BACKUP_PATH")]
#[case("HOMELAB_BACKUP_RETENTION_DAYS")]
fn test_every_repository_variable_is_required(#[case] var: &str) {
    let builder = EnvBuilder::new().without(var);

    let err = RepositoryConfig::from_env(builder.env()).unwrap_err();
    assert!(err.to_string().contains(var));
}

#[rstest]
#[case("0")]
#[case("-1")]
#[case("thirty")]
#[case("1.5")]
#[case("")]
fn test_invalid_retention_is_rejected(#[case] value: &str) {
    let builder = EnvBuilder::new().with_var(VAR_RETENTION_DAYS, value);

    let err = RepositoryConfig::from_env(builder.env()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_paperless_task_runs_exporter_first() {
    let plan = EnvBuilder::new().plan();

    let paperless = plan
        .tasks
        .iter()
        .find(|t| t.name == "paperless-ngx-webserver-export")
        .unwrap();
    match &paperless.source {
        TaskSource::Directory { pre_command, .. } => {
            assert_eq!(pre_command.as_deref(), Some(PAPERLESS_EXPORT_COMMAND));
            assert!(PAPERLESS_EXPORT_COMMAND.contains("document_exporter"));
        }
        other => panic!("unexpected source {:?}", other),
    }
}

#[test]
fn test_database_tasks_use_expected_engines() {
    let plan = EnvBuilder::new().plan();

    let engines: Vec<_> = plan
        .tasks
        .iter()
        .filter_map(|t| match &t.source {
            TaskSource::Database(db) => Some((db.container.as_str(), db.engine)),
            _ => None,
        })
        .collect();

    assert_eq!(
        engines,
        vec![
            ("immich_postgres", DatabaseEngine::Postgres),
            ("firefly_db", DatabaseEngine::MariaDb),
        ]
    );
}

#[test]
fn test_repository_debug_output_is_redacted() {
    let repository = EnvBuilder::new().repository();

    assert!(!format!("{:?}", repository).contains(SAMPLE_PASSPHRASE));
}

#[test]
#[serial]
fn test_system_env_reads_process_environment() {
    let name = "HOMELAB_BACKUP_TEST_SYSTEM_ENV";
    std::env::set_var(name, "from-process");

    assert_eq!(SystemEnv.get_env(name).as_deref(), Some("from-process"));

    std::env::remove_var(name);
    match SystemEnv.get_required_env(name) {
        Err(ConfigError::MissingVar(missing)) => assert_eq!(missing, name),
        other => panic!("expected a missing variable, got {:?}", other),
    }
}
