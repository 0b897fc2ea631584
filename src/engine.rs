use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::WalkError;
use crate::results::{ScanStats, WalkStep};
use crate::sys::NativeBackend;
use crate::traits::Backend;

// ---------------------------------------------------------------------------
// WalkConfig
// ---------------------------------------------------------------------------

/// Traversal flags, set through [`WalkBuilder`](crate::WalkBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkConfig {
    /// Yield a directory before its descendants (`true`) or after them.
    pub topdown: bool,

    /// Descend into symlinks that resolve to directories.
    pub follow_links: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            topdown: true,
            follow_links: false,
        }
    }
}

pub(crate) type ErrorHook<'a> = Box<dyn FnMut(WalkError) + 'a>;

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// A lazy directory tree walk.
///
/// Each directory is opened, fully enumerated, and closed before its step
/// is handed out, so no native handle stays open while the consumer holds a
/// step, and abandoning the walk at any point leaks nothing.
///
/// Recursion uses an explicit stack; depth is bounded only by the tree.
///
/// Directories that cannot be opened or read are skipped along with
/// everything beneath them and reported to the `on_error` hook if one was
/// set. The walk itself never fails.
pub struct Walk<'a, B: Backend = NativeBackend> {
    backend: B,
    config: WalkConfig,
    on_error: Option<ErrorHook<'a>>,
    stack: Vec<Frame>,
    current: Option<Current>,
    // identities of the directories on the descent path, follow_links only
    ancestors: Vec<Option<DirId>>,
    stats: ScanStats,
}

enum Frame {
    Open { path: PathBuf, depth: usize },
    Yield(WalkStep),
}

/// The step most recently handed out.
struct Current {
    step: WalkStep,
    depth: usize,
    // dirnames entry -> is a symlink; empty when following links
    links: HashMap<OsString, bool>,
    descend: bool,
}

impl<'a, B: Backend> Walk<'a, B> {
    pub(crate) fn new(
        top: PathBuf,
        backend: B,
        config: WalkConfig,
        on_error: Option<ErrorHook<'a>>,
    ) -> Self {
        Self {
            backend,
            config,
            on_error,
            stack: vec![Frame::Open { path: top, depth: 0 }],
            current: None,
            ancestors: Vec::new(),
            stats: ScanStats::default(),
        }
    }

    /// The flags this walk was built with.
    pub fn config(&self) -> WalkConfig {
        self.config
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Advance to the next directory and lend out its step.
    ///
    /// In topdown mode the walker has not descended yet when this returns:
    /// removing names from `dirnames` before the next call prunes those
    /// subtrees, and names added are descended into as well. Reordering
    /// changes the visit order. In bottom-up mode the children were already
    /// visited and edits have no effect.
    ///
    /// ```rust
    /// let dir = tempfile::tempdir().unwrap();
    /// std::fs::create_dir_all(dir.path().join("skip/deep")).unwrap();
    /// std::fs::create_dir(dir.path().join("keep")).unwrap();
    ///
    /// let mut walk = scanwalk::walk(dir.path()).build();
    /// let mut visited = Vec::new();
    /// while let Some(step) = walk.next_mut() {
    ///     step.dirnames.retain(|name| name != "skip");
    ///     visited.push(step.path.clone());
    /// }
    /// assert_eq!(visited, [dir.path().to_path_buf(), dir.path().join("keep")]);
    /// ```
    pub fn next_mut(&mut self) -> Option<&mut WalkStep> {
        if let Some(current) = self.current.take() {
            if current.descend {
                let children = self.children(&current.step, &current.links, current.depth);
                self.stack.extend(children.into_iter().rev());
            }
        }

        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Open { path, depth } => {
                    let Some((step, links)) = self.list(path, depth) else {
                        continue;
                    };
                    if self.config.topdown {
                        self.current = Some(Current {
                            step,
                            depth,
                            links,
                            descend: true,
                        });
                        break;
                    }
                    let children = self.children(&step, &links, depth);
                    self.stack.push(Frame::Yield(step));
                    self.stack.extend(children.into_iter().rev());
                }
                Frame::Yield(step) => {
                    self.current = Some(Current {
                        step,
                        depth: 0,
                        links: HashMap::new(),
                        descend: false,
                    });
                    break;
                }
            }
        }

        self.current.as_mut().map(|c| &mut c.step)
    }

    /// Open, enumerate, and partition one directory.
    fn list(&mut self, path: PathBuf, depth: usize) -> Option<(WalkStep, HashMap<OsString, bool>)> {
        if self.config.follow_links && !self.enter(&path, depth) {
            return None;
        }

        let dir = match self.backend.open(&path) {
            Ok(dir) => dir,
            Err(err) => {
                self.fail(err);
                return None;
            }
        };
        self.stats.dirs_opened += 1;

        let mut dirnames = Vec::new();
        let mut filenames = Vec::new();
        let mut links = HashMap::new();

        for entry in dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.fail(err);
                    return None;
                }
            };
            if entry.is_dir(true) {
                if !self.config.follow_links {
                    links.insert(entry.name().to_os_string(), entry.is_symlink());
                }
                dirnames.push(entry.into_name());
            } else {
                filenames.push(entry.into_name());
            }
        }

        self.stats.dirs += dirnames.len();
        self.stats.files += filenames.len();

        let step = WalkStep {
            path,
            dirnames,
            filenames,
        };
        Some((step, links))
    }

    /// Frames for the subdirectories of `step` that should be descended.
    fn children(&self, step: &WalkStep, links: &HashMap<OsString, bool>, depth: usize) -> Vec<Frame> {
        step.dirnames
            .iter()
            .filter_map(|name| {
                let path = step.path.join(name);
                if !self.config.follow_links {
                    // names the consumer added were never classified
                    let is_link = links.get(name).copied().unwrap_or_else(|| {
                        fs::symlink_metadata(&path)
                            .map(|m| m.file_type().is_symlink())
                            .unwrap_or(false)
                    });
                    if is_link {
                        return None;
                    }
                }
                Some(Frame::Open {
                    path,
                    depth: depth + 1,
                })
            })
            .collect()
    }

    /// Cycle guard for followed links. Returns `false` when `path` must not
    /// be entered.
    ///
    /// A directory whose identity can't be read is let through; the open
    /// that follows reports whatever is wrong with it.
    fn enter(&mut self, path: &Path, depth: usize) -> bool {
        self.ancestors.truncate(depth);
        let id = dir_id(path);
        if id.is_some() && self.ancestors.contains(&id) {
            warn!(path = %path.display(), "symlink cycle, not descending");
            self.stats.loops += 1;
            self.report(WalkError::SymlinkLoop(path.to_path_buf()));
            return false;
        }
        self.ancestors.push(id);
        true
    }

    fn fail(&mut self, err: WalkError) {
        debug!(path = %err.path().display(), error = %err, "skipping subtree");
        self.stats.errors += 1;
        self.report(err);
    }

    fn report(&mut self, err: WalkError) {
        if let Some(hook) = self.on_error.as_mut() {
            hook(err);
        }
    }
}

#[cfg(unix)]
type DirId = (u64, u64);

#[cfg(not(unix))]
type DirId = PathBuf;

/// Device and inode of the directory `path` resolves to.
#[cfg(unix)]
fn dir_id(path: &Path) -> Option<DirId> {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(path).ok().map(|m| (m.dev(), m.ino()))
}

/// std has no stable file identity off unix; the resolved path stands in.
#[cfg(not(unix))]
fn dir_id(path: &Path) -> Option<DirId> {
    fs::canonicalize(path).ok()
}

impl<B: Backend> Iterator for Walk<'_, B> {
    type Item = WalkStep;

    /// Owned steps, for when pruning isn't needed. Topdown steps are cloned
    /// so the walker can still descend; use [`Walk::next_mut`] to prune.
    fn next(&mut self) -> Option<WalkStep> {
        self.next_mut()?;
        let current = self.current.as_mut()?;
        if current.descend {
            return Some(current.step.clone());
        }
        self.current.take().map(|c| c.step)
    }
}
