//! Concurrent execution of backup tasks
//!
//! Every task runs on tokio's blocking pool. The batch waits for all of them,
//! whatever happens to any single one, and reports every failure together.

use crate::strategies::{BackupTask, TaskError};
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tokio::task::JoinSet;
use tracing::{error, info};

/// A task that did not produce its backup
#[derive(Debug)]
pub struct TaskFailure {
    pub task: String,
    pub error: TaskError,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.task, error_chain(&self.error))
    }
}

/// An error and all of its sources, joined with `: `
pub fn error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Every failure of one batch run
///
/// Displayed as a summary line followed by one line per failed task, each
/// carrying the task's full cause chain.
#[derive(Debug, thiserror::Error)]
#[error("{} of {total} backup task(s) failed: {}{}", .failures.len(), task_names(.failures), failure_lines(.failures))]
pub struct BatchError {
    failures: Vec<TaskFailure>,
    total: usize,
}

fn task_names(failures: &[TaskFailure]) -> String {
    failures
        .iter()
        .map(|f| f.task.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn failure_lines(failures: &[TaskFailure]) -> String {
    failures.iter().map(|f| format!("\n  - {}", f)).collect()
}

impl BatchError {
    pub fn failures(&self) -> &[TaskFailure] {
        &self.failures
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskFailure> {
        self.failures.iter()
    }

    /// Whether the named task is among the failures
    pub fn contains(&self, task: &str) -> bool {
        self.failures.iter().any(|f| f.task == task)
    }

    /// The error of the named task, if it failed
    pub fn error_for(&self, task: &str) -> Option<&TaskError> {
        self.failures.iter().find(|f| f.task == task).map(|f| &f.error)
    }

    /// Number of tasks in the run, successful ones included
    pub fn total(&self) -> usize {
        self.total
    }
}

impl<'a> IntoIterator for &'a BatchError {
    type Item = &'a TaskFailure;
    type IntoIter = std::slice::Iter<'a, TaskFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}

/// Tasks to run together; consumed by [`BackupBatch::run_all`]
#[derive(Default)]
pub struct BackupBatch {
    tasks: Vec<Box<dyn BackupTask>>,
}

impl BackupBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, task: Box<dyn BackupTask>) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task concurrently and wait for all of them
    ///
    /// Produced paths are returned in the order tasks were added.
    pub async fn run_all(self) -> Result<Vec<PathBuf>, BatchError> {
        let total = self.tasks.len();
        if total == 0 {
            info!("No backup tasks to run");
            return Ok(Vec::new());
        }

        info!("Running {} backup task(s) concurrently", total);

        let mut names = Vec::with_capacity(total);
        let mut set = JoinSet::new();
        for (index, task) in self.tasks.into_iter().enumerate() {
            names.push(task.name().to_string());
            set.spawn_blocking(move || (index, run_guarded(task.as_ref())));
        }

        let mut produced = Vec::with_capacity(total);
        let mut failures = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, Ok(path))) => {
                    info!(task = %names[index], "Backup task succeeded: {:?}", path);
                    produced.push((index, path));
                }
                Ok((index, Err(e))) => {
                    error!(task = %names[index], "Backup task failed: {}", error_chain(&e));
                    failures.push((index, e));
                }
                // Panics are caught inside the task, so this is cancellation only
                Err(e) => {
                    error!("Backup task did not complete: {}", e);
                    failures.push((usize::MAX, TaskError::Aborted(e.to_string())));
                }
            }
        }

        if failures.is_empty() {
            produced.sort_by_key(|(index, _)| *index);
            info!("All {} backup task(s) succeeded", total);
            return Ok(produced.into_iter().map(|(_, path)| path).collect());
        }

        failures.sort_by_key(|(index, _)| *index);
        let failures = failures
            .into_iter()
            .map(|(index, error)| TaskFailure {
                task: names.get(index).cloned().unwrap_or_else(|| "<unknown>".to_string()),
                error,
            })
            .collect();

        Err(BatchError { failures, total })
    }
}

/// Run a task, turning a panic into a task failure
fn run_guarded(task: &dyn BackupTask) -> Result<PathBuf, TaskError> {
    match panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(TaskError::Aborted(format!("panicked: {}", message)))
        }
    }
}
