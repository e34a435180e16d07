//! Configuration for homelab-backup
//!
//! Everything is read from environment variables, optionally seeded from a
//! `.env` file in the working directory. Lookups go through the [`Env`] trait
//! so the whole configuration can be resolved from an in-memory map in tests.
//!
//! ## Example Usage
//!
//! ```no_run
//! use homelab_backup::config::{self, LocalBackupPlan, RepositoryConfig, SystemEnv};
//!
//! config::load_dotenv().log();
//! let repository = RepositoryConfig::from_env(&SystemEnv)?;
//! let plan = LocalBackupPlan::from_env(&SystemEnv)?;
//!
//! for task in &plan.tasks {
//!     println!("{} -> {:?}", task.name, task.destination);
//! }
//! # Ok::<(), config::ConfigError>(())
//! ```

mod env;
mod plan;
mod types;

pub use env::{
    load_dotenv, parse_positive, ConfigError, DotenvStatus, Env, MapEnv, Result, SystemEnv,
};
pub use plan::{DatabaseSource, LocalBackupPlan, TaskSource, TaskSpec, PAPERLESS_EXPORT_COMMAND};
pub use types::*;
