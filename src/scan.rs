use std::ffi::OsString;
use std::path::Path;

use crate::entry::DirEntry;
use crate::error::WalkError;
use crate::sys::NativeBackend;
use crate::traits::{Backend, BackendDir};

/// A one-level scan of a single directory.
///
/// Yields [`DirEntry`] values in native order, `.` and `..` excluded. The
/// handle is released as soon as the entries run out, on a read error, on
/// [`close`](ScanDir::close), or when the scan is dropped.
///
/// # Example
///
/// ```rust
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::create_dir(dir.path().join("sub")).unwrap();
/// std::fs::write(dir.path().join("a.txt"), "a").unwrap();
///
/// let mut dirs = 0;
/// for entry in scanwalk::scandir(dir.path()).unwrap() {
///     let entry = entry.unwrap();
///     if entry.is_dir(true) {
///         dirs += 1;
///     }
/// }
/// assert_eq!(dirs, 1);
/// ```
pub struct ScanDir<B: Backend = NativeBackend> {
    inner: B::Dir,
}

impl<B: Backend> ScanDir<B> {
    pub(crate) fn open(backend: &B, path: &Path) -> Result<Self, WalkError> {
        Ok(Self {
            inner: backend.open(path)?,
        })
    }

    /// Release the directory handle before the scan is exhausted.
    pub fn close(mut self) -> Result<(), WalkError> {
        self.inner.close()
    }
}

impl<B: Backend> Iterator for ScanDir<B> {
    type Item = Result<DirEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Scan `path` with the platform's native backend.
pub fn scandir(path: impl AsRef<Path>) -> Result<ScanDir, WalkError> {
    ScanDir::open(&NativeBackend::default(), path.as_ref())
}

/// Scan `path` with an explicitly chosen backend.
pub fn scandir_with<B: Backend>(backend: &B, path: impl AsRef<Path>) -> Result<ScanDir<B>, WalkError> {
    ScanDir::open(backend, path.as_ref())
}

/// Names in `path`, in native order, without `.` and `..`.
pub fn listdir(path: impl AsRef<Path>) -> Result<Vec<OsString>, WalkError> {
    scandir(path)?
        .map(|entry| entry.map(DirEntry::into_name))
        .collect()
}
