use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Source of named configuration values
pub trait Env: Send + Sync {
    /// Look up a variable; `None` when it is not set
    fn get_env(&self, name: &str) -> Option<String>;

    /// Look up a variable that must be set
    fn get_required_env(&self, name: &str) -> Result<String> {
        self.get_env(name)
            .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
    }
}

/// Reads the process environment
#[derive(Debug, Clone, Default)]
pub struct SystemEnv;

impl Env for SystemEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory environment, used by tests and for overriding values
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.vars.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

impl Env for MapEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// What happened when looking for a `.env` file
#[derive(Debug)]
pub enum DotenvStatus {
    Loaded(PathBuf),
    NotFound,
    Failed(dotenv::Error),
}

impl DotenvStatus {
    /// Report the outcome; call once logging is installed
    pub fn log(&self) {
        match self {
            DotenvStatus::Loaded(path) => info!("Loaded environment from {:?}", path),
            DotenvStatus::NotFound => {
                info!(".env file not found in current directory, continuing without it")
            }
            DotenvStatus::Failed(e) => {
                warn!("Error loading .env file, continuing without it: {}", e)
            }
        }
    }
}

/// Load a `.env` file from the current directory into the process environment
///
/// Variables already set in the environment take precedence. A missing file is
/// not an error. Logs nothing; report the returned status with
/// [`DotenvStatus::log`] once logging is installed.
pub fn load_dotenv() -> DotenvStatus {
    match dotenv::dotenv() {
        Ok(path) => DotenvStatus::Loaded(path),
        Err(e) if e.not_found() => DotenvStatus::NotFound,
        Err(e) => DotenvStatus::Failed(e),
    }
}

/// Parse a strictly positive integer from a named variable
pub fn parse_positive(name: &str, value: &str) -> Result<u32> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let parsed: u32 = value
        .trim()
        .parse()
        .map_err(|_| invalid("expected a positive integer"))?;
    if parsed == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(parsed)
}
