use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use homelab_backup::config::{self, LocalBackupPlan, RepositoryConfig, SystemEnv};
use homelab_backup::managers::cloud::CloudBackup;
use homelab_backup::managers::local::run_local_backup;
use homelab_backup::managers::logging::{init_logging, LoggingConfig};
use homelab_backup::strategies::TaskContext;
use homelab_backup::utils::command::find_missing_programs;
use homelab_backup::utils::{docker, RealExecutor};
use homelab_backup::REQUIRED_PROGRAMS;
use std::path::PathBuf;
use tracing::{error, info};

/// Exit status when a required program is missing from PATH
const EXIT_MISSING_TOOLS: i32 = 2;

#[derive(Parser)]
#[command(name = "homelab-backup")]
#[command(about = "Local and cloud backups for homelab services", long_about = None)]
#[command(version)]
struct Cli {
    /// Console log level (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "info",
          value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: String,

    /// Also write DEBUG logs to daily-rotated files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy every service's data into the local backup directory
    Local {
        /// Do not run `docker compose up -d` first
        #[arg(long)]
        no_start: bool,
    },

    /// Operate on the remote restic repository
    Cloud {
        #[command(subcommand)]
        command: CloudCommands,
    },
}

#[derive(Subcommand)]
enum CloudCommands {
    /// Initialize the repository if needed, upload the local backup, and prune old snapshots
    Backup,

    /// Initialize the repository if it does not exist
    Init,

    /// Verify repository integrity
    Check,

    /// List snapshots
    Snapshots,

    /// Forget snapshots outside the retention window and prune their data
    Prune,

    /// Restore the latest snapshot into a directory
    Restore {
        /// Directory to restore into (created if missing)
        #[arg(short, long)]
        target: PathBuf,
    },

    /// List files in a snapshot
    LsFiles {
        /// Snapshot ID
        #[arg(short, long)]
        snapshot: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env may carry RUST_LOG, so it is read before the subscriber is built
    let dotenv_status = config::load_dotenv();

    let logging_config = LoggingConfig::new(&cli.log_level, cli.log_dir.as_deref());
    let log_guard = init_logging(&logging_config)?;
    dotenv_status.log();

    // Configuration first: a missing variable is reported even without docker or restic
    match cli.command {
        Commands::Local { no_start } => {
            let plan = LocalBackupPlan::from_env(&SystemEnv)
                .context("Failed to load backup configuration")?;
            if !required_programs_present() {
                drop(log_guard);
                std::process::exit(EXIT_MISSING_TOOLS);
            }
            handle_local(plan, no_start)
        }
        Commands::Cloud { command } => {
            let repository = RepositoryConfig::from_env(&SystemEnv)
                .context("Failed to load repository configuration")?;
            if !required_programs_present() {
                drop(log_guard);
                std::process::exit(EXIT_MISSING_TOOLS);
            }
            handle_cloud(repository, command)
        }
    }
}

fn required_programs_present() -> bool {
    let missing = find_missing_programs(REQUIRED_PROGRAMS);
    if missing.is_empty() {
        return true;
    }
    error!("Required programs not found in PATH: {}", missing.join(", "));
    eprintln!("Please install the following and try again: {}", missing.join(", "));
    false
}

fn handle_local(plan: LocalBackupPlan, no_start: bool) -> Result<()> {
    if no_start {
        info!("Skipping service start (--no-start)");
    } else {
        info!("Starting all services...");
        docker::compose_up(&RealExecutor::new(), &[]).context("Failed to start services")?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let produced = runtime
        .block_on(run_local_backup(plan, TaskContext::system()))
        .context("Local backup failed")?;

    println!("✓ Local backup completed ({} item(s))", produced.len());
    Ok(())
}

fn handle_cloud(repository: RepositoryConfig, command: CloudCommands) -> Result<()> {
    let cloud = CloudBackup::new(repository);
    match command {
        CloudCommands::Backup => {
            cloud.run_full_backup()?;
            println!("✓ Cloud backup completed successfully");
        }
        CloudCommands::Init => cloud.init()?,
        CloudCommands::Check => cloud.check()?,
        CloudCommands::Snapshots => cloud.list_snapshots()?,
        CloudCommands::Prune => cloud.prune()?,
        CloudCommands::Restore { target } => {
            cloud.restore(&target)?;
            println!("✓ Restore completed successfully");
        }
        CloudCommands::LsFiles { snapshot } => cloud.list_files(&snapshot)?,
    }
    Ok(())
}
