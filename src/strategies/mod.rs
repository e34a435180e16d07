pub mod database;
pub mod directory;

pub use database::{DatabaseDump, DatabaseEngine};
pub use directory::DirectoryBackup;

use crate::config::{TaskSource, TaskSpec};
use crate::utils::command::CommandError;
use crate::utils::docker::ReadinessError;
use crate::utils::files::FsError;
use crate::utils::{
    CommandExecutor, ContainerOperations, DockerContainerOps, FileOperations, RealExecutor,
    RealFileOps,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("failed to create destination directory")]
    CreateDestination(#[source] FsError),

    #[error("pre-command failed")]
    PreCommand(#[source] CommandError),

    #[error("source directory {0:?} does not exist")]
    SourceNotFound(PathBuf),

    #[error("source {0:?} is not a directory")]
    SourceNotADirectory(PathBuf),

    #[error("failed to inspect source directory")]
    SourceCheck(#[source] FsError),

    #[error("failed to copy source directory")]
    Copy(#[source] FsError),

    #[error("database never became ready")]
    Readiness(#[from] ReadinessError),

    #[error("failed to dump {engine} database {database}")]
    Dump {
        engine: DatabaseEngine,
        database: String,
        #[source]
        source: CommandError,
    },

    #[error("task did not run to completion: {0}")]
    Aborted(String),
}

/// One unit of local backup work
pub trait BackupTask: Send + Sync {
    /// Short name used in logs and batch errors
    fn name(&self) -> &str;

    fn destination(&self) -> &Path;

    /// Produce the backup and return the path that now holds it
    fn run(&self) -> Result<PathBuf, TaskError>;
}

/// The side-effecting collaborators a task runs against
#[derive(Clone)]
pub struct TaskContext {
    pub files: Arc<dyn FileOperations>,
    pub executor: Arc<dyn CommandExecutor>,
    pub containers: Arc<dyn ContainerOperations>,
}

impl TaskContext {
    pub fn new(
        files: Arc<dyn FileOperations>,
        executor: Arc<dyn CommandExecutor>,
        containers: Arc<dyn ContainerOperations>,
    ) -> Self {
        Self {
            files,
            executor,
            containers,
        }
    }

    /// Real filesystem, real processes, and the Docker CLI
    pub fn system() -> Self {
        let executor: Arc<dyn CommandExecutor> = Arc::new(RealExecutor::new());
        Self {
            files: Arc::new(RealFileOps::new()),
            containers: Arc::new(DockerContainerOps::new(executor.clone())),
            executor,
        }
    }
}

/// Build the task described by a plan entry
pub fn build_task(spec: &TaskSpec, ctx: &TaskContext) -> Box<dyn BackupTask> {
    match &spec.source {
        TaskSource::Directory { path, pre_command } => {
            let task = DirectoryBackup::new(path, &spec.destination, ctx);
            match pre_command {
                Some(command) => Box::new(task.with_pre_command(command)),
                None => Box::new(task),
            }
        }
        TaskSource::Database(source) => {
            Box::new(DatabaseDump::new(source.clone(), &spec.destination, ctx))
        }
    }
}

/// Last path component, used as the default task name
pub(crate) fn name_from_destination(destination: &Path) -> String {
    destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| destination.display().to_string())
}
