//! Filesystem utilities for preparing and populating backup directories

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("path is not absolute: {0:?}")]
    NotAbsolute(PathBuf),

    #[error("failed to create directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("required directory not found: {0:?}")]
    DirNotFound(PathBuf),

    #[error("path is not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("failed to check path {path:?}")]
    CheckPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {path:?}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {from:?} to {to:?}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to resolve absolute path for {path:?}")]
    AbsolutePath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn require_absolute(path: &Path) -> Result<(), FsError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(FsError::NotAbsolute(path.to_path_buf()))
    }
}

/// Create a directory (and its parents) if it does not exist yet
pub fn create_dir_if_missing(path: &Path) -> Result<(), FsError> {
    require_absolute(path)?;
    fs::create_dir_all(path).map_err(|source| FsError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Created directory: {:?}", path);
    Ok(())
}

/// Require that a path exists and is a directory
pub fn require_dir(path: &Path) -> Result<(), FsError> {
    require_absolute(path)?;
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FsError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(FsError::DirNotFound(path.to_path_buf()))
        }
        Err(source) => Err(FsError::CheckPath {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Remove everything inside a directory, creating it if it does not exist
///
/// The directory itself is kept so that mount points survive.
pub fn empty_dir(path: &Path) -> Result<(), FsError> {
    create_dir_if_missing(path)?;
    info!("Preparing backup directory: {:?}", path);

    let entries = fs::read_dir(path).map_err(|source| FsError::CheckPath {
        path: path.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| FsError::CheckPath {
            path: path.to_path_buf(),
            source,
        })?;
        let item = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        let removed = if is_dir {
            fs::remove_dir_all(&item)
        } else {
            fs::remove_file(&item)
        };
        removed.map_err(|source| FsError::Remove {
            path: item.clone(),
            source,
        })?;

        if is_dir {
            info!("Removed sub-directory: {:?}", item);
        } else {
            info!("Removed file/symlink: {:?}", item);
        }
    }

    info!("Successfully prepared backup directory: {:?}", path);
    Ok(())
}

/// Recursively copy the contents of `src` into `dst`, preserving file modes
///
/// Directory modes are applied after their contents are written, so read-only
/// directories can still be filled.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<(), FsError> {
    debug!("Copying directory {:?} to {:?}", src, dst);

    let copy_err = |from: &Path, to: &Path, source: io::Error| FsError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let mut dir_modes = Vec::new();

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| copy_err(src, dst, e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| copy_err(entry.path(), dst, io::Error::new(io::ErrorKind::Other, e)))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| copy_err(entry.path(), &target, e))?;
            let perms = entry
                .metadata()
                .map_err(|e| copy_err(entry.path(), &target, e.into()))?
                .permissions();
            dir_modes.push((target, perms));
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target).map_err(|e| copy_err(entry.path(), &target, e))?;
        } else {
            // fs::copy carries the permission bits over
            fs::copy(entry.path(), &target).map_err(|e| copy_err(entry.path(), &target, e))?;
        }
    }

    for (dir, perms) in dir_modes.into_iter().rev() {
        fs::set_permissions(&dir, perms).map_err(|e| copy_err(src, &dir, e))?;
    }

    debug!("Successfully copied directory {:?} to {:?}", src, dst);
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let link_target = fs::read_link(src)?;
    if fs::symlink_metadata(dst).is_ok() {
        fs::remove_file(dst)?;
    }
    std::os::unix::fs::symlink(link_target, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}

/// Delete a file; a file that is already gone is not an error
pub fn remove_file_if_exists(path: &Path) -> Result<(), FsError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed file: {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FsError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Resolve a path against the current working directory
pub fn absolute_path(path: &Path) -> Result<PathBuf, FsError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| FsError::AbsolutePath {
            path: path.to_path_buf(),
            source,
        })
}
