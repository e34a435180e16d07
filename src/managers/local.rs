//! Local backup manager - repopulates the backup root from the task plan

use super::batch::{BackupBatch, BatchError};
use crate::config::LocalBackupPlan;
use crate::strategies::{build_task, TaskContext};
use crate::utils::files::FsError;
use crate::utils::locker::{self, BackupLock, LockError};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum LocalBackupError {
    #[error("could not take the backup lock")]
    Lock(#[from] LockError),

    #[error("failed to prepare backup root {path:?}")]
    PrepareRoot {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    #[error(transparent)]
    Tasks(#[from] BatchError),
}

pub struct LocalBackupManager {
    plan: LocalBackupPlan,
    ctx: TaskContext,
    lock_path: PathBuf,
}

impl LocalBackupManager {
    pub fn new(plan: LocalBackupPlan, ctx: TaskContext) -> Self {
        Self {
            plan,
            ctx,
            lock_path: locker::default_lock_path(),
        }
    }

    /// Use a different lock file (tests use one per temp dir)
    pub fn with_lock_path(mut self, lock_path: impl Into<PathBuf>) -> Self {
        self.lock_path = lock_path.into();
        self
    }

    /// Empty the backup root and run every planned task into it
    ///
    /// Returns the produced paths in plan order.
    pub async fn run(&self) -> Result<Vec<PathBuf>, LocalBackupError> {
        let mut lock = BackupLock::open(&self.lock_path)?;
        let _guard = lock.try_acquire()?;

        let start_time = Instant::now();
        let root = &self.plan.root;
        info!("Starting local backup into {:?}", root);

        self.ctx
            .files
            .empty_dir(root)
            .map_err(|source| LocalBackupError::PrepareRoot {
                path: root.clone(),
                source,
            })?;

        let mut batch = BackupBatch::new();
        for spec in &self.plan.tasks {
            info!(task = %spec.name, "Scheduling backup task -> {:?}", spec.destination);
            batch.add(build_task(spec, &self.ctx));
        }

        let produced = batch.run_all().await?;

        info!(
            "Local backup completed in {:.2}s ({} item(s))",
            start_time.elapsed().as_secs_f64(),
            produced.len()
        );
        Ok(produced)
    }
}

/// Run the local backup with the default lock file
pub async fn run_local_backup(
    plan: LocalBackupPlan,
    ctx: TaskContext,
) -> Result<Vec<PathBuf>, LocalBackupError> {
    LocalBackupManager::new(plan, ctx).run().await
}
