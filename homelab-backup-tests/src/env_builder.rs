//! Fluent API for building test environments
//!
//! Provides every variable the local plan and the repository config need,
//! with directory sources backed by real files in a temp dir.

use crate::fixtures::{
    write_sample_library, SAMPLE_ACCOUNT_ID, SAMPLE_ACCOUNT_KEY, SAMPLE_PASSPHRASE,
    SAMPLE_REPOSITORY,
};
use homelab_backup::config::{
    LocalBackupPlan, MapEnv, RepositoryConfig, VAR_B2_ACCOUNT_ID, VAR_B2_ACCOUNT_KEY,
    VAR_BACKUP_PATH, VAR_RESTIC_PASSWORD, VAR_RESTIC_REPOSITORY, VAR_RETENTION_DAYS,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Directory sources of the plan: (variable, directory name under `sources/`)
pub const DIRECTORY_SOURCES: &[(&str, &str)] = &[
    ("HOMELAB_CALIBRE_LIBRARY_PATH", "calibre-library"),
    ("HOMELAB_CALIBRE_CONF_PATH", "calibre-config"),
    ("HOMELAB_PAPERLESS_WEB_EXPORT_PATH", "paperless-export"),
    ("HOMELAB_IMMICH_WEB_UPLOAD_PATH", "immich-upload"),
];

/// Builder for a complete, valid environment
pub struct EnvBuilder {
    temp_dir: TempDir,
    env: MapEnv,
}

impl EnvBuilder {
    /// Every required variable set; sources exist and hold a few files
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("backup");
        let mut env = MapEnv::new()
            .with(VAR_BACKUP_PATH, root.to_string_lossy())
            .with(VAR_RESTIC_REPOSITORY, SAMPLE_REPOSITORY)
            .with(VAR_B2_ACCOUNT_ID, SAMPLE_ACCOUNT_ID)
            .with(VAR_B2_ACCOUNT_KEY, SAMPLE_ACCOUNT_KEY)
            .with(VAR_RESTIC_PASSWORD, SAMPLE_PASSPHRASE)
            .with(VAR_RETENTION_DAYS, "30");

        for (var, dir) in DIRECTORY_SOURCES {
            let source = temp_dir.path().join("sources").join(dir);
            fs::create_dir_all(&source).expect("Failed to create source directory");
            env.set(var, source.to_string_lossy());
        }
        write_sample_library(&temp_dir.path().join("sources/calibre-library"));
        fs::write(
            temp_dir.path().join("sources/calibre-config/app.db"),
            "settings",
        )
        .expect("Failed to write config fixture");
        fs::write(
            temp_dir.path().join("sources/paperless-export/manifest.json"),
            "[]",
        )
        .expect("Failed to write export fixture");
        fs::create_dir_all(temp_dir.path().join("sources/immich-upload/library/admin"))
            .expect("Failed to create upload fixture");
        fs::write(
            temp_dir.path().join("sources/immich-upload/library/admin/IMG_0001.jpg"),
            "jpeg",
        )
        .expect("Failed to write upload fixture");

        let env = Self::with_database(env, "HOMELAB_IMMICH_DB", "immich_postgres", "immich", "postgres");
        let env = Self::with_database(env, "HOMELAB_FIREFLY_DB", "firefly_db", "firefly", "firefly");

        Self { temp_dir, env }
    }

    fn with_database(env: MapEnv, prefix: &str, container: &str, database: &str, user: &str) -> MapEnv {
        env.with(&format!("{}_CONTAINER_NAME", prefix), container)
            .with(&format!("{}_DATABASE", prefix), database)
            .with(&format!("{}_USER", prefix), user)
            .with(&format!("{}_PASSWORD", prefix), format!("{}'s p4ss", user))
    }

    /// Override or add a variable
    pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.env.set(name, value);
        self
    }

    /// Remove a variable
    pub fn without(mut self, name: &str) -> Self {
        self.env.remove(name);
        self
    }

    pub fn env(&self) -> &MapEnv {
        &self.env
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Where the local backup is written
    pub fn backup_root(&self) -> PathBuf {
        self.temp_dir.path().join("backup")
    }

    /// Path of a directory source by its name under `sources/`
    pub fn source(&self, dir: &str) -> PathBuf {
        self.temp_dir.path().join("sources").join(dir)
    }

    /// A lock file private to this environment
    pub fn lock_path(&self) -> PathBuf {
        self.temp_dir.path().join("homelab-backup.lock")
    }

    /// Resolve the local plan, panicking on configuration errors
    pub fn plan(&self) -> LocalBackupPlan {
        LocalBackupPlan::from_env(&self.env).expect("Failed to resolve plan")
    }

    /// Resolve the repository config, panicking on configuration errors
    pub fn repository(&self) -> RepositoryConfig {
        RepositoryConfig::from_env(&self.env).expect("Failed to resolve repository config")
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}
