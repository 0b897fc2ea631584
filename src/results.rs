use std::ffi::OsString;
use std::path::PathBuf;

/// One directory visited by a walk: its path and its entries split into
/// subdirectory names and everything else.
///
/// In topdown mode, `dirnames` is the pruning surface: whatever it holds
/// when the walk is resumed is exactly what gets descended into, in order.
/// Edit it through the step lent by [`Walk::next_mut`](crate::Walk::next_mut).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkStep {
    /// The directory, as joined from the walk root.
    pub path: PathBuf,

    /// Entries that are directories, or symlinks resolving to one.
    pub dirnames: Vec<OsString>,

    /// All other entries, including dangling symlinks.
    pub filenames: Vec<OsString>,
}

impl WalkStep {
    /// Split into the `(path, dirnames, filenames)` triple.
    pub fn into_parts(self) -> (PathBuf, Vec<OsString>, Vec<OsString>) {
        (self.path, self.dirnames, self.filenames)
    }
}

/// Running counters for a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Directory handles successfully opened.
    pub dirs_opened: usize,

    /// Names reported in `dirnames` across all steps.
    pub dirs: usize,

    /// Names reported in `filenames` across all steps.
    pub files: usize,

    /// Subtrees skipped because they could not be opened or read.
    pub errors: usize,

    /// Directories not descended because they resolve to an ancestor.
    pub loops: usize,
}
