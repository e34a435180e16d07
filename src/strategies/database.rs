//! Database dump backup
//!
//! Runs the engine's dump utility inside the database container and redirects
//! its output to `<destination>/<database>.sql` on the host. The password is
//! passed as an environment assignment local to the dump process, never as an
//! argument.

use super::{name_from_destination, BackupTask, TaskContext, TaskError};
use crate::config::DatabaseSource;
use crate::utils::shell::quote;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseEngine {
    Postgres,
    MySql,
    MariaDb,
}

impl DatabaseEngine {
    /// Environment variable the dump utility reads the password from
    pub fn password_var(self) -> &'static str {
        match self {
            DatabaseEngine::Postgres => "PGPASSWORD",
            DatabaseEngine::MySql | DatabaseEngine::MariaDb => "MYSQL_PWD",
        }
    }

    /// Dump program and the flag that names the user
    pub fn dump_program(self) -> (&'static str, &'static str) {
        match self {
            DatabaseEngine::Postgres => ("pg_dump", "--username"),
            DatabaseEngine::MySql => ("mysqldump", "--user"),
            DatabaseEngine::MariaDb => ("mariadb-dump", "--user"),
        }
    }

    /// Command that succeeds once the server accepts connections
    pub fn readiness_probe(self) -> &'static str {
        match self {
            DatabaseEngine::Postgres => "pg_isready -q",
            DatabaseEngine::MySql => "mysqladmin ping --silent",
            DatabaseEngine::MariaDb => "mariadb-admin ping --silent",
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatabaseEngine::Postgres => "PostgreSQL",
            DatabaseEngine::MySql => "MySQL",
            DatabaseEngine::MariaDb => "MariaDB",
        };
        f.write_str(name)
    }
}

pub struct DatabaseDump {
    name: String,
    source: DatabaseSource,
    destination: PathBuf,
    ctx: TaskContext,
}

impl DatabaseDump {
    pub fn new(source: DatabaseSource, destination: impl Into<PathBuf>, ctx: &TaskContext) -> Self {
        let destination = destination.into();
        Self {
            name: name_from_destination(&destination),
            source,
            destination,
            ctx: ctx.clone(),
        }
    }

    fn with_engine(
        engine: DatabaseEngine,
        container: &str,
        database: &str,
        username: &str,
        password: &str,
        destination: impl Into<PathBuf>,
        ctx: &TaskContext,
    ) -> Self {
        let source = DatabaseSource {
            engine,
            container: container.to_string(),
            database: database.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };
        Self::new(source, destination, ctx)
    }

    pub fn postgres(
        container: &str,
        database: &str,
        username: &str,
        password: &str,
        destination: impl Into<PathBuf>,
        ctx: &TaskContext,
    ) -> Self {
        Self::with_engine(DatabaseEngine::Postgres, container, database, username, password, destination, ctx)
    }

    pub fn mysql(
        container: &str,
        database: &str,
        username: &str,
        password: &str,
        destination: impl Into<PathBuf>,
        ctx: &TaskContext,
    ) -> Self {
        Self::with_engine(DatabaseEngine::MySql, container, database, username, password, destination, ctx)
    }

    pub fn mariadb(
        container: &str,
        database: &str,
        username: &str,
        password: &str,
        destination: impl Into<PathBuf>,
        ctx: &TaskContext,
    ) -> Self {
        Self::with_engine(DatabaseEngine::MariaDb, container, database, username, password, destination, ctx)
    }

    pub fn engine(&self) -> DatabaseEngine {
        self.source.engine
    }

    /// Host path the dump is written to
    pub fn dump_file(&self) -> PathBuf {
        self.destination.join(format!("{}.sql", self.source.database))
    }

    /// The command passed to `docker exec`
    ///
    /// The dump script runs under `/bin/bash -c` in the container; the trailing
    /// redirection is evaluated by the host shell.
    pub fn dump_command(&self) -> String {
        let engine = self.source.engine;
        let (program, user_flag) = engine.dump_program();
        let script = format!(
            "{}={} {} {} {} {}",
            engine.password_var(),
            quote(&self.source.password),
            program,
            user_flag,
            quote(&self.source.username),
            quote(&self.source.database),
        );
        format!(
            "/bin/bash -c {} > {}",
            quote(&script),
            quote(&self.dump_file().to_string_lossy())
        )
    }
}

impl BackupTask for DatabaseDump {
    fn name(&self) -> &str {
        &self.name
    }

    fn destination(&self) -> &Path {
        &self.destination
    }

    fn run(&self) -> Result<PathBuf, TaskError> {
        let engine = self.source.engine;
        let container = &self.source.container;
        info!(
            task = %self.name,
            "Running {} backup of database {} in container {}", engine, self.source.database, container
        );

        self.ctx
            .files
            .create_dir_if_missing(&self.destination)
            .map_err(TaskError::CreateDestination)?;

        self.ctx
            .containers
            .wait_until_successful(container, engine.readiness_probe())?;

        let dump_file = self.dump_file();
        if let Err(source) = self.ctx.containers.exec(container, &self.dump_command()) {
            // The host redirection has already created the file
            if let Err(e) = self.ctx.files.remove_file_if_exists(&dump_file) {
                warn!(task = %self.name, "Could not remove partial dump {:?}: {}", dump_file, e);
            }
            return Err(TaskError::Dump {
                engine,
                database: self.source.database.clone(),
                source,
            });
        }

        info!(task = %self.name, "Database dump written to {:?}", dump_file);
        Ok(dump_file)
    }
}
