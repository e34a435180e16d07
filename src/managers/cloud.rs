//! Cloud backup manager - synchronizes the local backup root with the restic repository

use crate::config::RepositoryConfig;
use crate::utils::files::FsError;
use crate::utils::restic_ops::{ResticEnv, ResticError};
use crate::utils::{FileOperations, RealFileOps, RealResticOps, ResticOperations};
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Prefix of the tag attached to every scheduled snapshot
pub const AUTOMATIC_TAG_PREFIX: &str = "automatic-";

#[derive(Debug, thiserror::Error)]
pub enum CloudBackupError {
    #[error("failed to initialize repository")]
    Init(#[source] ResticError),

    #[error("backup path {path:?} is not usable")]
    SourceDir {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    #[error("failed to create backup")]
    Backup(#[source] ResticError),

    #[error("failed to prune old backups")]
    Prune(#[source] ResticError),

    #[error("repository check failed")]
    Check(#[source] ResticError),

    #[error("failed to list snapshots")]
    ListSnapshots(#[source] ResticError),

    #[error("failed to prepare restore target {path:?}")]
    RestoreTarget {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    #[error("failed to restore snapshot")]
    Restore(#[source] ResticError),

    #[error("failed to list files in snapshot {snapshot_id}")]
    ListFiles {
        snapshot_id: String,
        #[source]
        source: ResticError,
    },
}

pub type Result<T> = std::result::Result<T, CloudBackupError>;

/// Tag for a snapshot taken at `now`
pub fn automatic_tag<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}{}", AUTOMATIC_TAG_PREFIX, now.format("%Y-%m-%d_%H-%M-%S"))
}

pub struct CloudBackup {
    config: RepositoryConfig,
    restic: Arc<dyn ResticOperations>,
    files: Arc<dyn FileOperations>,
}

impl CloudBackup {
    /// Use the restic CLI and the real filesystem
    pub fn new(config: RepositoryConfig) -> Self {
        let restic = RealResticOps::new(ResticEnv::from_config(&config));
        Self::with_ops(config, Arc::new(restic), Arc::new(RealFileOps::new()))
    }

    pub fn with_ops(
        config: RepositoryConfig,
        restic: Arc<dyn ResticOperations>,
        files: Arc<dyn FileOperations>,
    ) -> Self {
        Self {
            config,
            restic,
            files,
        }
    }

    /// init, then back up the local root, then forget and prune old snapshots
    ///
    /// Stops at the first failing step.
    pub fn run_full_backup(&self) -> Result<()> {
        let start_time = Instant::now();
        info!("Starting full cloud backup workflow");

        self.init()?;

        let source = &self.config.source_path;
        self.files
            .require_dir(source)
            .map_err(|e| CloudBackupError::SourceDir {
                path: source.clone(),
                source: e,
            })?;

        let tags = vec![automatic_tag(&Local::now())];
        info!("Creating backup of {:?} with tags {:?}", source, tags);
        self.restic
            .backup(source, &tags)
            .map_err(CloudBackupError::Backup)?;
        info!("Backup completed successfully");

        self.prune()?;

        info!(
            "Full cloud backup workflow completed in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        info!("Checking if repository exists...");
        self.restic.init().map_err(CloudBackupError::Init)?;
        info!("Repository ready");
        Ok(())
    }

    pub fn check(&self) -> Result<()> {
        info!("Checking repository integrity...");
        self.restic.check().map_err(CloudBackupError::Check)?;
        info!("Repository check completed successfully");
        Ok(())
    }

    pub fn list_snapshots(&self) -> Result<()> {
        info!("Listing snapshots...");
        self.restic
            .snapshots()
            .map_err(CloudBackupError::ListSnapshots)
    }

    /// Forget snapshots outside the retention window and prune their data
    pub fn prune(&self) -> Result<()> {
        let keep_within = self.config.keep_within();
        info!("Pruning old backups (keep within {})", keep_within);
        self.restic
            .forget(&keep_within, true)
            .map_err(CloudBackupError::Prune)?;
        info!("Pruning completed successfully");
        Ok(())
    }

    /// Restore the latest snapshot, creating the target directory if needed
    pub fn restore(&self, target: &Path) -> Result<()> {
        let target_error = |source| CloudBackupError::RestoreTarget {
            path: target.to_path_buf(),
            source,
        };
        let target = self.files.absolute_path(target).map_err(target_error)?;
        self.files
            .create_dir_if_missing(&target)
            .map_err(target_error)?;

        info!("Restoring latest snapshot into {:?}", target);
        self.restic
            .restore(&target)
            .map_err(CloudBackupError::Restore)?;
        info!("Restore completed successfully into {:?}", target);
        Ok(())
    }

    pub fn list_files(&self, snapshot_id: &str) -> Result<()> {
        info!("Listing files in snapshot {}", snapshot_id);
        self.restic
            .list_files(snapshot_id)
            .map_err(|source| CloudBackupError::ListFiles {
                snapshot_id: snapshot_id.to_string(),
                source,
            })
    }
}
