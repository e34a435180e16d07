//! Homelab Backup Library
//!
//! Local backups of service data (directory copies and database dumps) and
//! their synchronization to a restic repository.

pub mod config;
pub mod managers;
pub mod strategies;
pub mod utils;

// Re-export commonly used types
pub use config::{Env, LocalBackupPlan, MapEnv, RepositoryConfig, SystemEnv};
pub use managers::batch::{BackupBatch, BatchError, TaskFailure};
pub use managers::cloud::{CloudBackup, CloudBackupError};
pub use managers::local::{run_local_backup, LocalBackupError, LocalBackupManager};
pub use managers::logging::{init_logging, LogGuard, LoggingConfig};
pub use strategies::{build_task, BackupTask, TaskContext, TaskError};

/// Programs that must be on PATH before any backup command runs
pub const REQUIRED_PROGRAMS: &[&str] = &["docker", "restic", "sh"];
