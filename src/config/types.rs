use super::env::{parse_positive, Env, Result};
use std::fmt;
use std::path::PathBuf;

pub const VAR_RESTIC_REPOSITORY: &str = "HOMELAB_BACKUP_RESTIC_REPOSITORY";
pub const VAR_B2_ACCOUNT_ID: &str = "HOMELAB_BACKUP_B2_ACCOUNT_ID";
pub const VAR_B2_ACCOUNT_KEY: &str = "HOMELAB_BACKUP_B2_ACCOUNT_KEY";
pub const VAR_RESTIC_PASSWORD: &str = "HOMELAB_BACKUP_RESTIC_PASSWORD";
pub const VAR_BACKUP_PATH: &str = "HOMELAB_BACKUP_PATH";
pub const VAR_RETENTION_DAYS: &str = "HOMELAB_BACKUP_RETENTION_DAYS";

/// Connection details and policy for the remote restic repository
#[derive(Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub repository_url: String,
    pub account_id: String,
    pub account_key: String,
    pub passphrase: String,
    /// Local directory that is uploaded (the root of the local backup)
    pub source_path: PathBuf,
    /// Snapshots older than this many days are forgotten
    pub retention_days: u32,
}

impl RepositoryConfig {
    /// Resolve every repository setting, failing on the first missing one
    pub fn from_env(env: &dyn Env) -> Result<Self> {
        let retention = env.get_required_env(VAR_RETENTION_DAYS)?;

        Ok(Self {
            repository_url: env.get_required_env(VAR_RESTIC_REPOSITORY)?,
            account_id: env.get_required_env(VAR_B2_ACCOUNT_ID)?,
            account_key: env.get_required_env(VAR_B2_ACCOUNT_KEY)?,
            passphrase: env.get_required_env(VAR_RESTIC_PASSWORD)?,
            source_path: PathBuf::from(env.get_required_env(VAR_BACKUP_PATH)?),
            retention_days: parse_positive(VAR_RETENTION_DAYS, &retention)?,
        })
    }

    /// The `--keep-within` window derived from the retention policy
    pub fn keep_within(&self) -> String {
        format!("{}d", self.retention_days)
    }
}

impl fmt::Debug for RepositoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("repository_url", &self.repository_url)
            .field("account_id", &"<redacted>")
            .field("account_key", &"<redacted>")
            .field("passphrase", &"<redacted>")
            .field("source_path", &self.source_path)
            .field("retention_days", &self.retention_days)
            .finish()
    }
}
