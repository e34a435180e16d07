//! Test context and harness
//!
//! Bundles a temp directory with recording mocks for processes and containers,
//! and hands out [`TaskContext`]s wired to them.

use anyhow::Result;
use homelab_backup::strategies::TaskContext;
use homelab_backup::utils::docker_ops::mock::MockContainerOps;
use homelab_backup::utils::executor::mock::MockExecutor;
use homelab_backup::utils::files_ops::mock::MockFileOps;
use homelab_backup::utils::RealFileOps;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test context that manages test resources and provides common utilities
pub struct TestContext {
    /// Temporary directory for test files
    temp_dir: TempDir,
    /// Records host shell commands (pre-commands)
    pub executor: MockExecutor,
    /// Records container exec and readiness calls
    pub containers: MockContainerOps,
    /// Records filesystem calls when the mocked filesystem is used
    pub files: MockFileOps,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            executor: MockExecutor::new(),
            containers: MockContainerOps::new(),
            files: MockFileOps::new(),
        }
    }

    /// Replace the container mock (e.g. one that never becomes ready)
    pub fn with_containers(mut self, containers: MockContainerOps) -> Self {
        self.containers = containers;
        self
    }

    pub fn with_executor(mut self, executor: MockExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_files(mut self, files: MockFileOps) -> Self {
        self.files = files;
        self
    }

    /// Real filesystem, mocked processes and containers
    pub fn task_context(&self) -> TaskContext {
        TaskContext::new(
            Arc::new(RealFileOps::new()),
            Arc::new(self.executor.clone()),
            Arc::new(self.containers.clone()),
        )
    }

    /// Everything mocked, filesystem included
    pub fn mocked_task_context(&self) -> TaskContext {
        TaskContext::new(
            Arc::new(self.files.clone()),
            Arc::new(self.executor.clone()),
            Arc::new(self.containers.clone()),
        )
    }

    /// Get the temporary directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a subdirectory in the temp dir
    pub fn create_subdir(&self, name: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::create_dir_all(&path).expect("Failed to create subdirectory");
        path
    }

    /// Create a file in the temp dir
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Read a file from the temp directory
    pub fn read_file(&self, name: &str) -> Result<String> {
        let path = self.temp_dir.path().join(name);
        Ok(std::fs::read_to_string(path)?)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension trait for assertion helpers
pub trait ResultAssertions<T> {
    /// Assert that the result is Ok and return the value
    fn assert_ok(self) -> T;

    /// Assert that the result is Err and its rendering (cause chain included) contains the given string
    fn assert_err_contains(self, needle: &str);
}

impl<T: std::fmt::Debug, E: std::fmt::Debug> ResultAssertions<T> for std::result::Result<T, E> {
    fn assert_ok(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    }

    fn assert_err_contains(self, needle: &str) {
        match self {
            Ok(v) => panic!("Expected Err containing '{}', got Ok: {:?}", needle, v),
            Err(e) => {
                let err_msg = format!("{:?}", e);
                assert!(
                    err_msg.contains(needle),
                    "Error '{}' does not contain '{}'",
                    err_msg,
                    needle
                );
            }
        }
    }
}

/// Extension trait for Option assertions
pub trait OptionAssertions<T> {
    /// Assert that the option is Some and return the value
    fn assert_some(self) -> T;
}

impl<T: std::fmt::Debug> OptionAssertions<T> for Option<T> {
    fn assert_some(self) -> T {
        match self {
            Some(v) => v,
            None => panic!("Expected Some, got None"),
        }
    }
}
