//! Test fixtures and sample data

use homelab_backup::config::RepositoryConfig;
use std::fs;
use std::path::{Path, PathBuf};

pub const SAMPLE_REPOSITORY: &str = "b2:homelab-backups:/restic";
pub const SAMPLE_ACCOUNT_ID: &str = "0012ab34cd56";
pub const SAMPLE_ACCOUNT_KEY: &str = "K001secret-application-key";
pub const SAMPLE_PASSPHRASE: &str = "correct horse battery staple";

/// Repository settings with recognisable secrets
pub fn sample_repository_config(source_path: impl Into<PathBuf>) -> RepositoryConfig {
    RepositoryConfig {
        repository_url: SAMPLE_REPOSITORY.to_string(),
        account_id: SAMPLE_ACCOUNT_ID.to_string(),
        account_key: SAMPLE_ACCOUNT_KEY.to_string(),
        passphrase: SAMPLE_PASSPHRASE.to_string(),
        source_path: source_path.into(),
        retention_days: 30,
    }
}

/// Passwords that break naive shell interpolation
pub fn hostile_passwords() -> Vec<&'static str> {
    vec![
        "q'q'q",
        "it's",
        "''",
        r#"double "quotes""#,
        "$(touch /tmp/pwned)",
        "`id`",
        "semi;colon && pipe | amp &",
        "back\\slash",
        "new\nline",
        "$HOME ${PATH}",
        "",
    ]
}

/// Populate `root` with a small tree resembling a calibre library
///
/// Returns the relative paths of the files written.
pub fn write_sample_library(root: &Path) -> Vec<PathBuf> {
    let files = [
        ("metadata.db", "sqlite"),
        ("Ursula K. Le Guin/The Dispossessed (12)/cover.jpg", "jpeg"),
        ("Ursula K. Le Guin/The Dispossessed (12)/book.epub", "epub"),
        ("Iain M. Banks/Excession (7)/book.epub", "epub"),
    ];
    files
        .iter()
        .map(|(relative, content)| {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create fixture directory");
            }
            fs::write(&path, content).expect("Failed to write fixture file");
            PathBuf::from(relative)
        })
        .collect()
}
