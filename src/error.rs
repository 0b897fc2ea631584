use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sys;

/// Failure to open, read, or stat a directory entry.
///
/// Every native failure lands in one of four buckets. `SymlinkLoop` is only
/// produced by the walker when following links and a directory resolves to
/// one of its own ancestors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("os error {code}: {}", .path.display())]
    Other { path: PathBuf, code: i32 },

    #[error("symlink loop: {}", .0.display())]
    SymlinkLoop(PathBuf),
}

impl WalkError {
    /// Map a native error code (errno on POSIX, Win32 error on Windows).
    pub fn from_raw_os_error(path: impl Into<PathBuf>, code: i32) -> Self {
        let path = path.into();
        match sys::classify_os_error(code) {
            Some(io::ErrorKind::NotFound) => Self::NotFound(path),
            Some(io::ErrorKind::PermissionDenied) => Self::PermissionDenied(path),
            Some(io::ErrorKind::NotADirectory) => Self::NotADirectory(path),
            _ => Self::Other { path, code },
        }
    }

    /// Map a `std::io::Error`, preferring its native code when it has one.
    pub fn from_io(path: impl Into<PathBuf>, err: &io::Error) -> Self {
        let path = path.into();
        if let Some(code) = err.raw_os_error() {
            return Self::from_raw_os_error(path, code);
        }
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            io::ErrorKind::NotADirectory => Self::NotADirectory(path),
            _ => Self::Other { path, code: 0 },
        }
    }

    /// The last native error of the calling thread, attributed to `path`.
    pub(crate) fn last_os_error(path: &Path) -> Self {
        Self::from_io(path, &io::Error::last_os_error())
    }

    /// The path this error occurred at.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotADirectory(p)
            | Self::SymlinkLoop(p)
            | Self::Other { path: p, .. } => p,
        }
    }

    /// The native code behind `Other`, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Other { code, .. } if *code != 0 => Some(*code),
            _ => None,
        }
    }
}

impl From<WalkError> for io::Error {
    fn from(err: WalkError) -> Self {
        let kind = match &err {
            WalkError::NotFound(_) => io::ErrorKind::NotFound,
            WalkError::PermissionDenied(_) => io::ErrorKind::PermissionDenied,
            WalkError::NotADirectory(_) => io::ErrorKind::NotADirectory,
            WalkError::Other { code, .. } if *code != 0 => {
                return io::Error::from_raw_os_error(*code);
            }
            WalkError::Other { .. } | WalkError::SymlinkLoop(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
