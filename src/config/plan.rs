//! The local backup plan: which directories and databases are copied under the backup root

use super::env::{Env, Result};
use super::types::VAR_BACKUP_PATH;
use crate::strategies::DatabaseEngine;
use std::fmt;
use std::path::PathBuf;

/// Brings the paperless stack up and writes a fresh document export before it is copied
pub const PAPERLESS_EXPORT_COMMAND: &str = "docker compose start paperless-redis paperless-db paperless \
     && docker compose exec -T paperless document_exporter -d ../export";

/// Connection details for a database running in a container
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSource {
    pub engine: DatabaseEngine,
    pub container: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DatabaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSource")
            .field("engine", &self.engine)
            .field("container", &self.container)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSource {
    Directory {
        path: PathBuf,
        pre_command: Option<String>,
    },
    Database(DatabaseSource),
}

/// One entry of the plan, resolved from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    /// Short name used in logs and batch errors
    pub name: String,
    pub destination: PathBuf,
    pub source: TaskSource,
}

/// Everything the local backup needs, resolved up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBackupPlan {
    pub root: PathBuf,
    pub tasks: Vec<TaskSpec>,
}

impl LocalBackupPlan {
    /// Resolve the full plan; the first missing variable aborts resolution
    pub fn from_env(env: &dyn Env) -> Result<Self> {
        let root = PathBuf::from(env.get_required_env(VAR_BACKUP_PATH)?);

        let directory = |name: &str, var: &str, pre_command: Option<&str>| -> Result<TaskSpec> {
            Ok(TaskSpec {
                name: name.to_string(),
                destination: root.join(name),
                source: TaskSource::Directory {
                    path: PathBuf::from(env.get_required_env(var)?),
                    pre_command: pre_command.map(str::to_string),
                },
            })
        };

        let database = |name: &str, prefix: &str, engine: DatabaseEngine| -> Result<TaskSpec> {
            let var = |suffix: &str| env.get_required_env(&format!("{}_{}", prefix, suffix));
            Ok(TaskSpec {
                name: name.to_string(),
                destination: root.join(name),
                source: TaskSource::Database(DatabaseSource {
                    engine,
                    container: var("CONTAINER_NAME")?,
                    database: var("DATABASE")?,
                    username: var("USER")?,
                    password: var("PASSWORD")?,
                }),
            })
        };

        let tasks = vec![
            directory(
                "calibre-web-automated-calibre-library",
                "HOMELAB_CALIBRE_LIBRARY_PATH",
                None,
            )?,
            directory(
                "calibre-web-automated-config",
                "HOMELAB_CALIBRE_CONF_PATH",
                None,
            )?,
            directory(
                "paperless-ngx-webserver-export",
                "HOMELAB_PAPERLESS_WEB_EXPORT_PATH",
                Some(PAPERLESS_EXPORT_COMMAND),
            )?,
            database("immich-db", "HOMELAB_IMMICH_DB", DatabaseEngine::Postgres)?,
            directory("immich-library", "HOMELAB_IMMICH_WEB_UPLOAD_PATH", None)?,
            database("firefly-db", "HOMELAB_FIREFLY_DB", DatabaseEngine::MariaDb)?,
        ];

        Ok(Self { root, tasks })
    }
}
