//! Restic subprocess utilities
//!
//! Every restic invocation is a single shell line with the repository
//! credentials passed as environment assignments in front of the command.
//! Values are quoted individually, and command text is never logged.

use super::command::{CommandError, OutputMode};
use super::executor::CommandExecutor;
use super::shell::quote;
use crate::config::RepositoryConfig;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
#[error("restic {operation} failed")]
pub struct ResticError {
    pub operation: &'static str,
    #[source]
    pub source: CommandError,
}

/// Environment variables for restic, in the order they are written on the command line
#[derive(Clone)]
pub struct ResticEnv {
    vars: Vec<(&'static str, String)>,
}

impl ResticEnv {
    pub fn new(repository_url: &str, account_id: &str, account_key: &str, password: &str) -> Self {
        Self {
            vars: vec![
                ("RESTIC_REPOSITORY", repository_url.to_string()),
                ("B2_ACCOUNT_ID", account_id.to_string()),
                ("B2_ACCOUNT_KEY", account_key.to_string()),
                ("RESTIC_PASSWORD", password.to_string()),
            ],
        }
    }

    pub fn from_config(config: &RepositoryConfig) -> Self {
        Self::new(
            &config.repository_url,
            &config.account_id,
            &config.account_key,
            &config.passphrase,
        )
    }

    /// Get all environment variables
    pub fn vars(&self) -> &[(&'static str, String)] {
        &self.vars
    }

    /// `NAME='value' ...` assignments to put in front of the restic command
    pub fn shell_prefix(&self) -> String {
        self.vars
            .iter()
            .map(|(name, value)| format!("{}={}", name, quote(value)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for ResticEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.vars.iter().map(|(name, _)| *name).collect();
        f.debug_struct("ResticEnv").field("vars", &names).finish()
    }
}

/// Build the full shell line for a restic call
///
/// `args` are written as-is; callers quote anything that is not a fixed flag.
pub fn build_restic_command(env: &ResticEnv, args: &[String]) -> String {
    let mut command = format!("{} restic", env.shell_prefix());
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}

fn run_restic(
    executor: &dyn CommandExecutor,
    env: &ResticEnv,
    operation: &'static str,
    args: &[String],
    output: OutputMode,
) -> Result<(), ResticError> {
    debug!("Running restic {}", operation);
    executor
        .run_shell_command(&build_restic_command(env, args), output)
        .map_err(|source| ResticError { operation, source })
}

fn path_arg(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

/// Arguments for `restic backup`
pub fn backup_args(path: &Path, tags: &[String]) -> Vec<String> {
    let mut args = vec!["backup".to_string(), path_arg(path), "--verbose".to_string()];
    for tag in tags {
        args.push("--tag".to_string());
        args.push(quote(tag));
    }
    args
}

/// Arguments for `restic forget`
pub fn forget_args(keep_within: &str, prune: bool) -> Vec<String> {
    let mut args = vec![
        "forget".to_string(),
        "--keep-within".to_string(),
        quote(keep_within),
    ];
    if prune {
        args.push("--prune".to_string());
    }
    args
}

/// Arguments for `restic ls`
pub fn list_files_args(snapshot_id: &str) -> Vec<String> {
    vec!["ls".to_string(), quote(snapshot_id)]
}

/// Arguments for restoring the latest snapshot
pub fn restore_args(target: &Path) -> Vec<String> {
    vec![
        "restore".to_string(),
        "latest".to_string(),
        "--target".to_string(),
        path_arg(target),
        "--verbose".to_string(),
    ]
}

/// Initialize the repository unless it already exists
///
/// Existence is probed with `snapshots`; only a failed probe leads to `init`.
pub fn init_repository(executor: &dyn CommandExecutor, env: &ResticEnv) -> Result<(), ResticError> {
    info!("Checking whether the restic repository exists...");
    let probe = run_restic(
        executor,
        env,
        "snapshots",
        &["snapshots".to_string()],
        OutputMode::Discard,
    );

    match probe {
        Ok(()) => {
            info!("Repository already initialized");
            Ok(())
        }
        Err(e) => {
            debug!("Repository probe failed: {}", e);
            info!("Initializing restic repository...");
            run_restic(executor, env, "init", &["init".to_string()], OutputMode::Inherit)?;
            info!("Repository initialized successfully");
            Ok(())
        }
    }
}

pub fn backup(
    executor: &dyn CommandExecutor,
    env: &ResticEnv,
    path: &Path,
    tags: &[String],
) -> Result<(), ResticError> {
    info!("Starting restic backup of {:?}", path);
    run_restic(executor, env, "backup", &backup_args(path, tags), OutputMode::Inherit)
}

pub fn forget(
    executor: &dyn CommandExecutor,
    env: &ResticEnv,
    keep_within: &str,
    prune: bool,
) -> Result<(), ResticError> {
    info!("Forgetting snapshots older than {} (prune: {})", keep_within, prune);
    run_restic(
        executor,
        env,
        "forget",
        &forget_args(keep_within, prune),
        OutputMode::Inherit,
    )
}

pub fn check(executor: &dyn CommandExecutor, env: &ResticEnv) -> Result<(), ResticError> {
    run_restic(executor, env, "check", &["check".to_string()], OutputMode::Inherit)
}

/// List snapshots, streaming restic's table to the terminal
pub fn snapshots(executor: &dyn CommandExecutor, env: &ResticEnv) -> Result<(), ResticError> {
    run_restic(
        executor,
        env,
        "snapshots",
        &["snapshots".to_string()],
        OutputMode::Inherit,
    )
}

pub fn list_files(
    executor: &dyn CommandExecutor,
    env: &ResticEnv,
    snapshot_id: &str,
) -> Result<(), ResticError> {
    run_restic(executor, env, "ls", &list_files_args(snapshot_id), OutputMode::Inherit)
}

/// Restore the latest snapshot into `target`, which must already exist
pub fn restore_latest(
    executor: &dyn CommandExecutor,
    env: &ResticEnv,
    target: &Path,
) -> Result<(), ResticError> {
    info!("Restoring latest snapshot into {:?}", target);
    run_restic(executor, env, "restore", &restore_args(target), OutputMode::Inherit)
}
