//! File-based locking to prevent concurrent local backups

use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const LOCK_FILE_NAME: &str = "homelab-backup.lock";

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("failed to open lock file {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("another backup is already running (lock held on {0:?})")]
    AlreadyHeld(PathBuf),

    #[error("failed to acquire lock on {path:?}")]
    Acquire {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Advisory lock file shared by every local backup run on this host
pub struct BackupLock {
    lock: RwLock<File>,
    lock_path: PathBuf,
}

/// Held while a backup runs; the lock is released when this is dropped
pub struct BackupLockGuard<'a> {
    _guard: RwLockWriteGuard<'a, File>,
    lock_path: &'a Path,
}

impl BackupLock {
    /// Open the lock file, creating it if needed
    pub fn open(lock_path: impl Into<PathBuf>) -> Result<Self, LockError> {
        let lock_path = lock_path.into();
        debug!("Opening lock file: {:?}", lock_path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| LockError::Open {
                path: lock_path.clone(),
                source,
            })?;

        Ok(Self {
            lock: RwLock::new(file),
            lock_path,
        })
    }

    /// Take the exclusive lock without waiting
    pub fn try_acquire(&mut self) -> Result<BackupLockGuard<'_>, LockError> {
        let guard = match self.lock.try_write() {
            Ok(guard) => guard,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                return Err(LockError::AlreadyHeld(self.lock_path.clone()))
            }
            Err(source) => {
                return Err(LockError::Acquire {
                    path: self.lock_path.clone(),
                    source,
                })
            }
        };

        info!("Acquired backup lock: {:?}", self.lock_path);
        Ok(BackupLockGuard {
            _guard: guard,
            lock_path: &self.lock_path,
        })
    }
}

impl Drop for BackupLockGuard<'_> {
    fn drop(&mut self) {
        info!("Released backup lock: {:?}", self.lock_path);
    }
}

pub fn default_lock_path() -> PathBuf {
    std::env::temp_dir().join(LOCK_FILE_NAME)
}
