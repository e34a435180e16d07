//! Unit tests for database dump tasks

use homelab_backup::strategies::DatabaseDump;
use rstest::rstest;
use std::process::Command;
use test_utils::{hostile_passwords, BackupTask, DatabaseEngine, TaskError, TestContext};

fn dump(engine: DatabaseEngine, password: &str, ctx: &TestContext) -> DatabaseDump {
    let task_ctx = ctx.mocked_task_context();
    match engine {
        DatabaseEngine::Postgres => {
            DatabaseDump::postgres("db", "app", "app_user", password, "/backup/app-db", &task_ctx)
        }
        DatabaseEngine::MySql => {
            DatabaseDump::mysql("db", "app", "app_user", password, "/backup/app-db", &task_ctx)
        }
        DatabaseEngine::MariaDb => {
            DatabaseDump::mariadb("db", "app", "app_user", password, "/backup/app-db", &task_ctx)
        }
    }
}

/// What the host shell hands to `bash -c` inside the container
fn container_script(command: &str) -> String {
    let quoted = command
        .strip_prefix("/bin/bash -c ")
        .and_then(|rest| rest.rsplit_once(" > "))
        .map(|(script, _)| script)
        .unwrap();
    let output = Command::new("sh")
        .arg("-c")
        .arg(format!("printf %s {}", quoted))
        .output()
        .unwrap();
    String::from_utf8(output.stdout).unwrap()
}

#[rstest]
#[case(DatabaseEngine::Postgres, "pg_isready -q")]
#[case(DatabaseEngine::MySql, "mysqladmin ping --silent")]
#[case(DatabaseEngine::MariaDb, "mariadb-admin ping --silent")]
fn test_dump_waits_for_engine_probe(#[case] engine: DatabaseEngine, #[case] probe: &str) {
    let ctx = TestContext::new();

    let file = dump(engine, "pw", &ctx).run().unwrap();

    assert_eq!(file.to_string_lossy(), "/backup/app-db/app.sql");
    assert_eq!(
        ctx.containers.readiness_commands(),
        vec![("db".to_string(), probe.to_string())]
    );
    let execs = ctx.containers.exec_commands();
    assert_eq!(execs.len(), 1);
    assert!(execs[0].1.ends_with(" > '/backup/app-db/app.sql'"));
}

#[rstest]
#[case(DatabaseEngine::Postgres, "pg_dump --username 'app_user' 'app'")]
#[case(DatabaseEngine::MySql, "mysqldump --user 'app_user' 'app'")]
#[case(DatabaseEngine::MariaDb, "mariadb-dump --user 'app_user' 'app'")]
fn test_container_script_per_engine(#[case] engine: DatabaseEngine, #[case] tail: &str) {
    let ctx = TestContext::new();

    let task = dump(engine, "pw", &ctx);
    assert_eq!(task.engine(), engine);

    let script = container_script(&task.dump_command());

    assert_eq!(
        script,
        format!("{}='pw' {}", engine.password_var(), tail)
    );
}

#[cfg(unix)]
#[test]
fn test_hostile_passwords_reach_dump_unchanged() {
    let ctx = TestContext::new();

    for password in hostile_passwords() {
        let script = container_script(&dump(DatabaseEngine::MariaDb, password, &ctx).dump_command());
        let (assignment, rest) = script.split_once(" mariadb-dump").unwrap();
        assert_eq!(rest, " --user 'app_user' 'app'");

        let output = Command::new("sh")
            .arg("-c")
            .arg(format!("{} sh -c 'printf %s \"$MYSQL_PWD\"'", assignment))
            .output()
            .unwrap();
        assert_eq!(
            String::from_utf8(output.stdout).unwrap(),
            password,
            "password {:?} was altered",
            password
        );
    }
}

#[test]
fn test_never_ready_database_is_not_dumped() {
    let ctx = TestContext::new().with_containers(test_utils::MockContainerOps::new().with_never_ready());

    let err = dump(DatabaseEngine::Postgres, "pw", &ctx).run().unwrap_err();

    assert!(matches!(err, TaskError::Readiness(_)));
    assert!(ctx.containers.exec_commands().is_empty());
}

#[test]
fn test_dump_error_hides_password() {
    let ctx =
        TestContext::new().with_containers(test_utils::MockContainerOps::new().with_failing_exec(2));

    let err = dump(DatabaseEngine::MySql, "hunter2-secret", &ctx).run().unwrap_err();

    let rendered = format!("{} {:?}", err, err);
    assert!(rendered.contains("MySQL"));
    assert!(rendered.contains("app"));
    assert!(!rendered.contains("hunter2-secret"));
}
