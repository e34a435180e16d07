//! Filesystem operations abstraction for testability
//!
//! This module provides a trait-based abstraction for filesystem operations,
//! enabling dependency injection and mocking for tests.

use super::files::FsError;
use std::path::{Path, PathBuf};

/// Abstraction for filesystem operations, enabling mocking in tests
pub trait FileOperations: Send + Sync {
    /// Create a directory if it doesn't exist (path must be absolute)
    fn create_dir_if_missing(&self, path: &Path) -> Result<(), FsError>;

    /// Require that a directory exists
    fn require_dir(&self, path: &Path) -> Result<(), FsError>;

    /// Empty a directory, creating it if missing
    fn empty_dir(&self, path: &Path) -> Result<(), FsError>;

    /// Recursively copy the contents of `src` into `dst`
    fn copy_dir(&self, src: &Path, dst: &Path) -> Result<(), FsError>;

    /// Delete a file if it exists
    fn remove_file_if_exists(&self, path: &Path) -> Result<(), FsError>;

    /// Resolve a possibly relative path to an absolute one
    fn absolute_path(&self, path: &Path) -> Result<PathBuf, FsError>;
}

/// Default implementation using the real filesystem
#[derive(Debug, Clone, Default)]
pub struct RealFileOps;

impl RealFileOps {
    pub fn new() -> Self {
        Self
    }
}

impl FileOperations for RealFileOps {
    fn create_dir_if_missing(&self, path: &Path) -> Result<(), FsError> {
        super::files::create_dir_if_missing(path)
    }

    fn require_dir(&self, path: &Path) -> Result<(), FsError> {
        super::files::require_dir(path)
    }

    fn empty_dir(&self, path: &Path) -> Result<(), FsError> {
        super::files::empty_dir(path)
    }

    fn copy_dir(&self, src: &Path, dst: &Path) -> Result<(), FsError> {
        super::files::copy_dir(src, dst)
    }

    fn remove_file_if_exists(&self, path: &Path) -> Result<(), FsError> {
        super::files::remove_file_if_exists(path)
    }

    fn absolute_path(&self, path: &Path) -> Result<PathBuf, FsError> {
        super::files::absolute_path(path)
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Recorded filesystem call
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum FileCall {
        CreateDir { path: PathBuf },
        RequireDir { path: PathBuf },
        EmptyDir { path: PathBuf },
        CopyDir { src: PathBuf, dst: PathBuf },
        RemoveFile { path: PathBuf },
        AbsolutePath { path: PathBuf },
    }

    /// Which kind of failure `require_dir` should report
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum RequireDirFailure {
        NotFound,
        NotADirectory,
    }

    /// Mock filesystem that succeeds unless told otherwise
    #[derive(Clone, Default)]
    pub struct MockFileOps {
        /// Recorded calls
        pub calls: Arc<Mutex<Vec<FileCall>>>,
        fail_create: Arc<Mutex<bool>>,
        fail_require: Arc<Mutex<Option<RequireDirFailure>>>,
        fail_empty: Arc<Mutex<bool>>,
        fail_copy: Arc<Mutex<bool>>,
        fail_absolute: Arc<Mutex<bool>>,
        /// Base used to resolve relative paths in `absolute_path`
        cwd: Arc<Mutex<PathBuf>>,
    }

    impl MockFileOps {
        pub fn new() -> Self {
            let mock = Self::default();
            *mock.cwd.lock().unwrap() = PathBuf::from("/work");
            mock
        }

        pub fn with_failing_create(self) -> Self {
            *self.fail_create.lock().unwrap() = true;
            self
        }

        pub fn with_failing_require(self, failure: RequireDirFailure) -> Self {
            *self.fail_require.lock().unwrap() = Some(failure);
            self
        }

        pub fn with_failing_empty(self) -> Self {
            *self.fail_empty.lock().unwrap() = true;
            self
        }

        pub fn with_failing_copy(self) -> Self {
            *self.fail_copy.lock().unwrap() = true;
            self
        }

        pub fn with_failing_absolute(self) -> Self {
            *self.fail_absolute.lock().unwrap() = true;
            self
        }

        pub fn with_cwd(self, cwd: impl Into<PathBuf>) -> Self {
            *self.cwd.lock().unwrap() = cwd.into();
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<FileCall> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: FileCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn injected(message: &str) -> io::Error {
        io::Error::new(io::ErrorKind::Other, message.to_string())
    }

    impl FileOperations for MockFileOps {
        fn create_dir_if_missing(&self, path: &Path) -> Result<(), FsError> {
            self.record(FileCall::CreateDir {
                path: path.to_path_buf(),
            });
            if *self.fail_create.lock().unwrap() {
                return Err(FsError::CreateDir {
                    path: path.to_path_buf(),
                    source: injected("mock create failure"),
                });
            }
            Ok(())
        }

        fn require_dir(&self, path: &Path) -> Result<(), FsError> {
            self.record(FileCall::RequireDir {
                path: path.to_path_buf(),
            });
            match *self.fail_require.lock().unwrap() {
                Some(RequireDirFailure::NotFound) => Err(FsError::DirNotFound(path.to_path_buf())),
                Some(RequireDirFailure::NotADirectory) => {
                    Err(FsError::NotADirectory(path.to_path_buf()))
                }
                None => Ok(()),
            }
        }

        fn empty_dir(&self, path: &Path) -> Result<(), FsError> {
            self.record(FileCall::EmptyDir {
                path: path.to_path_buf(),
            });
            if *self.fail_empty.lock().unwrap() {
                return Err(FsError::Remove {
                    path: path.to_path_buf(),
                    source: injected("mock remove failure"),
                });
            }
            Ok(())
        }

        fn copy_dir(&self, src: &Path, dst: &Path) -> Result<(), FsError> {
            self.record(FileCall::CopyDir {
                src: src.to_path_buf(),
                dst: dst.to_path_buf(),
            });
            if *self.fail_copy.lock().unwrap() {
                return Err(FsError::Copy {
                    from: src.to_path_buf(),
                    to: dst.to_path_buf(),
                    source: injected("mock copy failure"),
                });
            }
            Ok(())
        }

        fn remove_file_if_exists(&self, path: &Path) -> Result<(), FsError> {
            self.record(FileCall::RemoveFile {
                path: path.to_path_buf(),
            });
            Ok(())
        }

        fn absolute_path(&self, path: &Path) -> Result<PathBuf, FsError> {
            self.record(FileCall::AbsolutePath {
                path: path.to_path_buf(),
            });
            if *self.fail_absolute.lock().unwrap() {
                return Err(FsError::AbsolutePath {
                    path: path.to_path_buf(),
                    source: injected("mock cwd failure"),
                });
            }
            Ok(self.cwd.lock().unwrap().join(path))
        }
    }
}
