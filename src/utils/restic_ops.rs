//! Restic operations abstraction for testability
//!
//! This module provides a trait-based abstraction for restic operations,
//! enabling dependency injection and mocking for tests.

use super::executor::{CommandExecutor, RealExecutor};
use std::path::Path;
use std::sync::Arc;

pub use super::restic::{ResticEnv, ResticError};

/// Abstraction for restic operations, enabling mocking in tests
pub trait ResticOperations: Send + Sync {
    /// Initialize the repository if it doesn't exist
    fn init(&self) -> Result<(), ResticError>;

    /// Back up one path, attaching the given tags to the snapshot
    fn backup(&self, path: &Path, tags: &[String]) -> Result<(), ResticError>;

    /// Forget snapshots outside the `keep_within` window, optionally pruning data
    fn forget(&self, keep_within: &str, prune: bool) -> Result<(), ResticError>;

    /// Check repository integrity
    fn check(&self) -> Result<(), ResticError>;

    /// List snapshots in the repository
    fn snapshots(&self) -> Result<(), ResticError>;

    /// List files in a snapshot
    fn list_files(&self, snapshot_id: &str) -> Result<(), ResticError>;

    /// Restore the latest snapshot into an existing directory
    fn restore(&self, target: &Path) -> Result<(), ResticError>;
}

/// Default implementation running the restic CLI through the shell
#[derive(Clone)]
pub struct RealResticOps {
    env: ResticEnv,
    executor: Arc<dyn CommandExecutor>,
}

impl RealResticOps {
    pub fn new(env: ResticEnv) -> Self {
        Self::with_executor(env, Arc::new(RealExecutor::new()))
    }

    pub fn with_executor(env: ResticEnv, executor: Arc<dyn CommandExecutor>) -> Self {
        Self { env, executor }
    }
}

impl ResticOperations for RealResticOps {
    fn init(&self) -> Result<(), ResticError> {
        super::restic::init_repository(self.executor.as_ref(), &self.env)
    }

    fn backup(&self, path: &Path, tags: &[String]) -> Result<(), ResticError> {
        super::restic::backup(self.executor.as_ref(), &self.env, path, tags)
    }

    fn forget(&self, keep_within: &str, prune: bool) -> Result<(), ResticError> {
        super::restic::forget(self.executor.as_ref(), &self.env, keep_within, prune)
    }

    fn check(&self) -> Result<(), ResticError> {
        super::restic::check(self.executor.as_ref(), &self.env)
    }

    fn snapshots(&self) -> Result<(), ResticError> {
        super::restic::snapshots(self.executor.as_ref(), &self.env)
    }

    fn list_files(&self, snapshot_id: &str) -> Result<(), ResticError> {
        super::restic::list_files(self.executor.as_ref(), &self.env, snapshot_id)
    }

    fn restore(&self, target: &Path) -> Result<(), ResticError> {
        super::restic::restore_latest(self.executor.as_ref(), &self.env, target)
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use crate::utils::command::CommandError;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Recorded operation call
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ResticCall {
        Init,
        Backup { path: PathBuf, tags: Vec<String> },
        Forget { keep_within: String, prune: bool },
        Check,
        Snapshots,
        ListFiles { snapshot_id: String },
        Restore { target: PathBuf },
    }

    /// Mock restic operations for testing
    #[derive(Clone, Default)]
    pub struct MockResticOps {
        /// Recorded operation calls
        pub calls: Arc<Mutex<Vec<ResticCall>>>,
        /// Operations (by restic subcommand name) that should fail
        failing: Arc<Mutex<HashSet<&'static str>>>,
    }

    impl MockResticOps {
        pub fn new() -> Self {
            Self::default()
        }

        fn failing_on(self, operation: &'static str) -> Self {
            self.failing.lock().unwrap().insert(operation);
            self
        }

        pub fn with_failing_init(self) -> Self {
            self.failing_on("init")
        }

        pub fn with_failing_backup(self) -> Self {
            self.failing_on("backup")
        }

        pub fn with_failing_forget(self) -> Self {
            self.failing_on("forget")
        }

        pub fn with_failing_check(self) -> Self {
            self.failing_on("check")
        }

        pub fn with_failing_snapshots(self) -> Self {
            self.failing_on("snapshots")
        }

        pub fn with_failing_list_files(self) -> Self {
            self.failing_on("ls")
        }

        pub fn with_failing_restore(self) -> Self {
            self.failing_on("restore")
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<ResticCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Tags passed to every recorded backup call
        pub fn backup_tags(&self) -> Vec<Vec<String>> {
            self.get_calls()
                .into_iter()
                .filter_map(|c| match c {
                    ResticCall::Backup { tags, .. } => Some(tags),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, operation: &'static str, call: ResticCall) -> Result<(), ResticError> {
            self.calls.lock().unwrap().push(call);
            if self.failing.lock().unwrap().contains(operation) {
                return Err(ResticError {
                    operation,
                    source: CommandError::ExitStatus {
                        program: "sh".to_string(),
                        code: Some(1),
                    },
                });
            }
            Ok(())
        }
    }

    impl ResticOperations for MockResticOps {
        fn init(&self) -> Result<(), ResticError> {
            self.record("init", ResticCall::Init)
        }

        fn backup(&self, path: &Path, tags: &[String]) -> Result<(), ResticError> {
            self.record(
                "backup",
                ResticCall::Backup {
                    path: path.to_path_buf(),
                    tags: tags.to_vec(),
                },
            )
        }

        fn forget(&self, keep_within: &str, prune: bool) -> Result<(), ResticError> {
            self.record(
                "forget",
                ResticCall::Forget {
                    keep_within: keep_within.to_string(),
                    prune,
                },
            )
        }

        fn check(&self) -> Result<(), ResticError> {
            self.record("check", ResticCall::Check)
        }

        fn snapshots(&self) -> Result<(), ResticError> {
            self.record("snapshots", ResticCall::Snapshots)
        }

        fn list_files(&self, snapshot_id: &str) -> Result<(), ResticError> {
            self.record(
                "ls",
                ResticCall::ListFiles {
                    snapshot_id: snapshot_id.to_string(),
                },
            )
        }

        fn restore(&self, target: &Path) -> Result<(), ResticError> {
            self.record(
                "restore",
                ResticCall::Restore {
                    target: target.to_path_buf(),
                },
            )
        }
    }
}
