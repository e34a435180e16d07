//! Docker utilities: running commands inside containers and waiting for them to become ready

use super::command::{CommandError, OutputMode};
use super::executor::CommandExecutor;
use super::shell::quote;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default pause between readiness attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of readiness attempts before giving up
pub const DEFAULT_POLL_ATTEMPTS: u32 = 30;

/// Fixed-interval, fixed-count retry settings for readiness polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadinessError {
    #[error("too many retries: `{command}` did not succeed in container {container} after {attempts} attempts")]
    TooManyRetries {
        container: String,
        command: String,
        attempts: u32,
    },
}

/// Build the host command line that runs `command` inside `container`
///
/// `command` is interpolated verbatim, so redirections in it apply on the host.
pub fn container_exec_command(container: &str, command: &str) -> String {
    format!("docker exec -i {} {}", quote(container), command)
}

/// Run a command inside an already-running container
pub fn exec_in_container(
    executor: &dyn CommandExecutor,
    container: &str,
    command: &str,
    output: OutputMode,
) -> Result<(), CommandError> {
    debug!("Executing command in container: {}", container);
    executor.run_shell_command(&container_exec_command(container, command), output)
}

/// Call `attempt` until it succeeds or `settings.max_attempts` is reached
///
/// Returns the number of attempts used on success, or the attempt count on
/// exhaustion. There is no pause after the final attempt.
pub fn poll_until_ok<E, F>(settings: PollSettings, mut attempt: F) -> Result<u32, u32>
where
    F: FnMut(u32) -> Result<(), E>,
    E: std::fmt::Display,
{
    for n in 1..=settings.max_attempts {
        match attempt(n) {
            Ok(()) => return Ok(n),
            Err(e) => {
                debug!("Attempt {}/{} failed: {}", n, settings.max_attempts, e);
                if n < settings.max_attempts {
                    thread::sleep(settings.interval);
                }
            }
        }
    }
    Err(settings.max_attempts)
}

/// Retry a command inside a container until it exits successfully
pub fn wait_until_successful(
    executor: &dyn CommandExecutor,
    container: &str,
    command: &str,
    settings: PollSettings,
) -> Result<(), ReadinessError> {
    info!(
        "Waiting for container {} to accept `{}` (up to {} attempts)",
        container, command, settings.max_attempts
    );

    match poll_until_ok(settings, |_| {
        exec_in_container(executor, container, command, OutputMode::Discard)
    }) {
        Ok(attempts) => {
            info!("Container {} is ready after {} attempt(s)", container, attempts);
            Ok(())
        }
        Err(attempts) => {
            warn!("Container {} never became ready", container);
            Err(ReadinessError::TooManyRetries {
                container: container.to_string(),
                command: command.to_string(),
                attempts,
            })
        }
    }
}

/// Start compose services (all of them when `services` is empty)
pub fn compose_up(executor: &dyn CommandExecutor, services: &[&str]) -> Result<(), CommandError> {
    let mut args = vec!["compose", "up", "-d"];
    args.extend_from_slice(services);
    executor.run_command("docker", &args, OutputMode::Inherit)
}
