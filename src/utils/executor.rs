//! Command execution abstraction for testability
//!
//! This module provides a trait-based abstraction for command execution,
//! enabling dependency injection and mocking for tests.

use super::command::{CommandError, OutputMode};

/// Abstraction for command execution, enabling mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run a program with an argument vector
    fn run_command(&self, program: &str, args: &[&str], output: OutputMode)
        -> Result<(), CommandError>;

    /// Run a full command line through `sh -c`
    fn run_shell_command(&self, command: &str, output: OutputMode) -> Result<(), CommandError>;
}

/// Default implementation using real subprocess calls
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealExecutor {
    fn run_command(
        &self,
        program: &str,
        args: &[&str],
        output: OutputMode,
    ) -> Result<(), CommandError> {
        super::command::run_command(program, args, output)
    }

    fn run_shell_command(&self, command: &str, output: OutputMode) -> Result<(), CommandError> {
        super::command::run_shell_command(command, output)
    }
}

/// A mock executor for testing that records calls and returns configured responses
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Recorded command invocation
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
        pub output: OutputMode,
    }

    impl CommandCall {
        /// The command line passed to `sh -c`, if this was a shell call
        pub fn shell_command(&self) -> Option<&str> {
            match (self.program.as_str(), self.args.as_slice()) {
                ("sh", [flag, command]) if flag == "-c" => Some(command.as_str()),
                _ => None,
            }
        }
    }

    /// Response configuration for mock
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub enum MockResponse {
        #[default]
        Success,
        Failure { exit_code: i32 },
    }

    /// Mock executor for testing
    ///
    /// Queued responses are consumed one per call; once the queue is empty the
    /// default response is returned.
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded command invocations
        pub calls: Arc<Mutex<Vec<CommandCall>>>,
        queued: Arc<Mutex<VecDeque<MockResponse>>>,
        default_response: Arc<Mutex<MockResponse>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue responses for the next calls, in order
        pub fn with_responses(self, responses: impl IntoIterator<Item = MockResponse>) -> Self {
            self.queued.lock().unwrap().extend(responses);
            self
        }

        /// Set the default response for calls beyond the queue
        pub fn with_default_response(self, response: MockResponse) -> Self {
            *self.default_response.lock().unwrap() = response;
            self
        }

        /// Make every call fail with the given exit code
        pub fn failing(exit_code: i32) -> Self {
            Self::new().with_default_response(MockResponse::Failure { exit_code })
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Command lines of all recorded shell calls, in order
        pub fn shell_commands(&self) -> Vec<String> {
            self.get_calls()
                .iter()
                .filter_map(|c| c.shell_command().map(str::to_string))
                .collect()
        }

        /// Get number of recorded calls
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn record_call(&self, program: &str, args: &[&str], output: OutputMode) -> MockResponse {
            self.calls.lock().unwrap().push(CommandCall {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
                output,
            });
            self.queued
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| *self.default_response.lock().unwrap())
        }
    }

    impl CommandExecutor for MockExecutor {
        fn run_command(
            &self,
            program: &str,
            args: &[&str],
            output: OutputMode,
        ) -> Result<(), CommandError> {
            match self.record_call(program, args, output) {
                MockResponse::Success => Ok(()),
                MockResponse::Failure { exit_code } => Err(CommandError::ExitStatus {
                    program: program.to_string(),
                    code: Some(exit_code),
                }),
            }
        }

        fn run_shell_command(&self, command: &str, output: OutputMode) -> Result<(), CommandError> {
            self.run_command("sh", &["-c", command], output)
        }
    }
}
