//! Directory backup
//!
//! Copies the contents of a source directory into the destination, optionally
//! running a shell pre-command first (for example, an application export).

use super::{name_from_destination, BackupTask, TaskContext, TaskError};
use crate::utils::command::OutputMode;
use crate::utils::files::FsError;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct DirectoryBackup {
    name: String,
    source: PathBuf,
    destination: PathBuf,
    pre_command: Option<String>,
    ctx: TaskContext,
}

impl DirectoryBackup {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        ctx: &TaskContext,
    ) -> Self {
        let destination = destination.into();
        Self {
            name: name_from_destination(&destination),
            source: source.into(),
            destination,
            pre_command: None,
            ctx: ctx.clone(),
        }
    }

    /// Shell command to run before copying; empty commands are skipped
    pub fn with_pre_command(mut self, command: impl Into<String>) -> Self {
        self.pre_command = Some(command.into());
        self
    }

    fn run_pre_command(&self) -> Result<(), TaskError> {
        let Some(command) = self.pre_command.as_deref().filter(|c| !c.trim().is_empty()) else {
            return Ok(());
        };

        info!(task = %self.name, "Running pre-command");
        self.ctx
            .executor
            .run_shell_command(command, OutputMode::Inherit)
            .map_err(TaskError::PreCommand)?;
        info!(task = %self.name, "Pre-command finished");
        Ok(())
    }
}

impl BackupTask for DirectoryBackup {
    fn name(&self) -> &str {
        &self.name
    }

    fn destination(&self) -> &Path {
        &self.destination
    }

    fn run(&self) -> Result<PathBuf, TaskError> {
        info!(
            task = %self.name,
            "Running directory backup: {:?} -> {:?}", self.source, self.destination
        );

        self.ctx
            .files
            .create_dir_if_missing(&self.destination)
            .map_err(TaskError::CreateDestination)?;

        self.run_pre_command()?;

        self.ctx.files.require_dir(&self.source).map_err(|e| match e {
            FsError::DirNotFound(path) => TaskError::SourceNotFound(path),
            FsError::NotADirectory(path) => TaskError::SourceNotADirectory(path),
            other => TaskError::SourceCheck(other),
        })?;

        self.ctx
            .files
            .copy_dir(&self.source, &self.destination)
            .map_err(TaskError::Copy)?;

        info!(task = %self.name, "Directory backup completed");
        Ok(self.destination.clone())
    }
}
