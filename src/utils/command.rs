//! Utilities for running external commands with proper error handling

use std::io;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, error};

/// Failure to run an external command
///
/// Never carries the text of a shell command line: those may embed credentials.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to execute {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {}", describe_status(.code))]
    ExitStatus { program: String, code: Option<i32> },
}

impl CommandError {
    /// Exit code reported by the process, if it ran and was not killed by a signal
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::ExitStatus { code, .. } => *code,
            CommandError::Spawn { .. } => None,
        }
    }
}

fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Where a command's stdout and stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Stream to the terminal of this process
    Inherit,
    /// Discard (used for existence probes and readiness checks)
    Discard,
}

impl OutputMode {
    fn stdio(self) -> Stdio {
        match self {
            OutputMode::Inherit => Stdio::inherit(),
            OutputMode::Discard => Stdio::null(),
        }
    }
}

fn run(mut cmd: Command, program: &str, output: OutputMode) -> Result<(), CommandError> {
    cmd.stdin(Stdio::null());
    cmd.stdout(output.stdio());
    cmd.stderr(output.stdio());

    let status: ExitStatus = cmd.status().map_err(|source| CommandError::Spawn {
        program: program.to_string(),
        source,
    })?;

    if !status.success() {
        if output == OutputMode::Inherit {
            error!("Command failed: {} ({})", program, status);
        } else {
            debug!("Command failed: {} ({})", program, status);
        }
        return Err(CommandError::ExitStatus {
            program: program.to_string(),
            code: status.code(),
        });
    }

    Ok(())
}

/// Run a program with an argument vector and wait for it to exit
pub fn run_command(program: &str, args: &[&str], output: OutputMode) -> Result<(), CommandError> {
    debug!("Running command: {} {}", program, args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args);
    run(cmd, program, output)
}

/// Run a full command line through `sh -c`
pub fn run_shell_command(command: &str, output: OutputMode) -> Result<(), CommandError> {
    debug!("Running shell command ({} bytes)", command.len());

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    run(cmd, "sh", output)
}

/// Require that every program is resolvable on PATH, returning the missing ones
pub fn find_missing_programs<'a>(programs: &[&'a str]) -> Vec<&'a str> {
    programs
        .iter()
        .copied()
        .filter(|program| which::which(program).is_err())
        .collect()
}
