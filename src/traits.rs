use std::path::Path;

use crate::entry::DirEntry;
use crate::error::WalkError;

/// A strategy for enumerating one directory.
///
/// Implement this to plug a different enumeration primitive under the
/// scanner and the walker. The crate ships [`NativeBackend`], picked at
/// compile time for the target platform, and [`StdBackend`], which sits on
/// `std::fs::read_dir` and works everywhere.
///
/// # Handle discipline
///
/// `open` acquires exactly one native handle. The returned [`Dir`] owns it
/// and must release it exactly once: when exhausted, when
/// [`close`](BackendDir::close) is called, or when it is dropped early,
/// whichever comes first. Handles are never shared, so `Dir` need not be
/// `Send`.
///
/// # Example
///
/// ```rust
/// use std::ffi::OsString;
/// use scanwalk::{walk, StdBackend};
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("a.txt"), "a").unwrap();
///
/// let steps: Vec<_> = walk(dir.path()).backend(StdBackend).into_iter().collect();
/// assert_eq!(steps.len(), 1);
/// assert_eq!(steps[0].filenames, [OsString::from("a.txt")]);
/// ```
///
/// [`NativeBackend`]: crate::NativeBackend
/// [`StdBackend`]: crate::StdBackend
/// [`Dir`]: Backend::Dir
pub trait Backend {
    type Dir: BackendDir;

    /// Open `path` for enumeration.
    fn open(&self, path: &Path) -> Result<Self::Dir, WalkError>;
}

/// An open directory handle produced by a [`Backend`].
///
/// Yields entries in native order with `.` and `..` already filtered out.
/// A read error ends the sequence after it is yielded.
pub trait BackendDir: Iterator<Item = Result<DirEntry, WalkError>> {
    /// Release the handle now. Later calls, and the eventual drop, are no-ops.
    fn close(&mut self) -> Result<(), WalkError>;
}
