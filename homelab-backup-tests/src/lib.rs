//! Test utilities for homelab-backup
//!
//! This crate provides shared test utilities, fixtures, and re-exports of the
//! mock implementations that live in the main crate.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{EnvBuilder, TestContext};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let env = EnvBuilder::new();
//!     let plan = env.plan();
//!     let ctx = TestContext::new();
//!     // ... test code
//! }
//! ```

pub mod env_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use env_builder::EnvBuilder;
pub use fixtures::*;
pub use test_context::{OptionAssertions, ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use homelab_backup::config::{
    DatabaseSource, Env, LocalBackupPlan, MapEnv, RepositoryConfig, TaskSource, TaskSpec,
};
pub use homelab_backup::strategies::{BackupTask, DatabaseEngine, TaskContext, TaskError};

// Re-export mock implementations from the main crate
pub use homelab_backup::utils::docker_ops::mock::{ContainerCall, MockContainerOps};
pub use homelab_backup::utils::docker_ops::ContainerOperations;
pub use homelab_backup::utils::executor::mock::{CommandCall, MockExecutor, MockResponse};
pub use homelab_backup::utils::executor::CommandExecutor;
pub use homelab_backup::utils::files_ops::mock::{FileCall, MockFileOps, RequireDirFailure};
pub use homelab_backup::utils::files_ops::FileOperations;
pub use homelab_backup::utils::restic_ops::mock::{MockResticOps, ResticCall};
pub use homelab_backup::utils::restic_ops::ResticOperations;

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
