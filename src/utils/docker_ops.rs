//! Container operations abstraction for testability
//!
//! This module provides a trait-based abstraction for Docker operations,
//! enabling dependency injection and mocking for tests.

use super::command::{CommandError, OutputMode};
use super::docker::{PollSettings, ReadinessError};
use super::executor::{CommandExecutor, RealExecutor};
use std::sync::Arc;

/// Abstraction for running commands inside containers, enabling mocking in tests
pub trait ContainerOperations: Send + Sync {
    /// Run a command inside a named, already-running container
    fn exec(&self, container: &str, command: &str) -> Result<(), CommandError>;

    /// Retry a command inside a container until it succeeds or retries run out
    fn wait_until_successful(&self, container: &str, command: &str) -> Result<(), ReadinessError>;
}

/// Default implementation using the Docker CLI
#[derive(Clone)]
pub struct DockerContainerOps {
    executor: Arc<dyn CommandExecutor>,
    poll: PollSettings,
}

impl DockerContainerOps {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            poll: PollSettings::default(),
        }
    }

    /// Override the readiness poll interval and attempt count
    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }
}

impl Default for DockerContainerOps {
    fn default() -> Self {
        Self::new(Arc::new(RealExecutor::new()))
    }
}

impl ContainerOperations for DockerContainerOps {
    fn exec(&self, container: &str, command: &str) -> Result<(), CommandError> {
        super::docker::exec_in_container(
            self.executor.as_ref(),
            container,
            command,
            OutputMode::Inherit,
        )
    }

    fn wait_until_successful(&self, container: &str, command: &str) -> Result<(), ReadinessError> {
        super::docker::wait_until_successful(self.executor.as_ref(), container, command, self.poll)
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Recorded container operation call
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ContainerCall {
        Exec { container: String, command: String },
        WaitUntilSuccessful { container: String, command: String },
    }

    /// Mock container operations for testing
    #[derive(Clone, Default)]
    pub struct MockContainerOps {
        /// Recorded operation calls
        pub calls: Arc<Mutex<Vec<ContainerCall>>>,
        /// Exit code returned by `exec`, if it should fail
        exec_failure: Arc<Mutex<Option<i32>>>,
        /// Whether the container never becomes ready
        never_ready: Arc<Mutex<bool>>,
    }

    impl MockContainerOps {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure `exec` to fail with the given exit code
        pub fn with_failing_exec(self, exit_code: i32) -> Self {
            *self.exec_failure.lock().unwrap() = Some(exit_code);
            self
        }

        /// Configure readiness polling to exhaust its retries
        pub fn with_never_ready(self) -> Self {
            *self.never_ready.lock().unwrap() = true;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<ContainerCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Commands passed to `exec`, in order
        pub fn exec_commands(&self) -> Vec<(String, String)> {
            self.get_calls()
                .into_iter()
                .filter_map(|c| match c {
                    ContainerCall::Exec { container, command } => Some((container, command)),
                    _ => None,
                })
                .collect()
        }

        /// Commands passed to `wait_until_successful`, in order
        pub fn readiness_commands(&self) -> Vec<(String, String)> {
            self.get_calls()
                .into_iter()
                .filter_map(|c| match c {
                    ContainerCall::WaitUntilSuccessful { container, command } => {
                        Some((container, command))
                    }
                    _ => None,
                })
                .collect()
        }
    }

    impl ContainerOperations for MockContainerOps {
        fn exec(&self, container: &str, command: &str) -> Result<(), CommandError> {
            self.calls.lock().unwrap().push(ContainerCall::Exec {
                container: container.to_string(),
                command: command.to_string(),
            });
            match *self.exec_failure.lock().unwrap() {
                Some(code) => Err(CommandError::ExitStatus {
                    program: "sh".to_string(),
                    code: Some(code),
                }),
                None => Ok(()),
            }
        }

        fn wait_until_successful(
            &self,
            container: &str,
            command: &str,
        ) -> Result<(), ReadinessError> {
            self.calls
                .lock()
                .unwrap()
                .push(ContainerCall::WaitUntilSuccessful {
                    container: container.to_string(),
                    command: command.to_string(),
                });
            if *self.never_ready.lock().unwrap() {
                return Err(ReadinessError::TooManyRetries {
                    container: container.to_string(),
                    command: command.to_string(),
                    attempts: crate::utils::docker::DEFAULT_POLL_ATTEMPTS,
                });
            }
            Ok(())
        }
    }
}
