//! # scanwalk
//!
//! Directory scanning on native OS primitives, and an `os.walk`-style tree
//! walker built on top of it.
//!
//! The scanner reads each directory with the platform's own enumeration
//! calls (`opendir`/`readdir_r` on POSIX, `FindFirstFileW`/`FindNextFileW`
//! on Windows) and keeps the type information those calls hand out for
//! free, so telling directories from files usually costs no extra `stat`.
//! The walker composes that into a lazy sequence of
//! `(path, dirnames, filenames)` steps, top-down or bottom-up, with pruning,
//! an opt-in symlink-follow policy, and per-subtree error reporting.
//!
//! # Quick Start
//!
//! ```rust
//! use std::ffi::OsString;
//! use std::fs;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let root = dir.path();
//! fs::write(root.join("fileA.txt"), "a").unwrap();
//! fs::create_dir(root.join("dirA")).unwrap();
//! fs::write(root.join("dirA/fileB.txt"), "b").unwrap();
//!
//! let steps: Vec<_> = scanwalk::walk(root).into_iter().collect();
//!
//! assert_eq!(steps.len(), 2);
//! assert_eq!(steps[0].path, root);
//! assert_eq!(steps[0].dirnames, [OsString::from("dirA")]);
//! assert_eq!(steps[0].filenames, [OsString::from("fileA.txt")]);
//! assert_eq!(steps[1].path, root.join("dirA"));
//! assert!(steps[1].dirnames.is_empty());
//! assert_eq!(steps[1].filenames, [OsString::from("fileB.txt")]);
//! ```
//!
//! # Pruning
//!
//! Build the [`Walk`] and drive it with [`Walk::next_mut`] to edit
//! `dirnames` before the walker descends:
//!
//! ```rust
//! # let dir = tempfile::tempdir().unwrap();
//! let mut walk = scanwalk::walk(dir.path()).build();
//! while let Some(step) = walk.next_mut() {
//!     step.dirnames.retain(|name| name != ".git" && name != "target");
//! }
//! ```
//!
//! # Single directories
//!
//! ```rust
//! # let dir = tempfile::tempdir().unwrap();
//! # std::fs::write(dir.path().join("x"), "").unwrap();
//! for entry in scanwalk::scandir(dir.path()).unwrap() {
//!     let entry = entry.unwrap();
//!     println!("{:?} dir={}", entry.name(), entry.is_dir(false));
//! }
//! ```

#![deny(unsafe_code)]

use std::path::Path;

mod builder;
mod engine;
mod entry;
mod error;
mod results;
mod scan;
mod sys;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::WalkBuilder;
pub use engine::{Walk, WalkConfig};
pub use entry::{DirEntry, TypeHint};
pub use error::WalkError;
pub use results::{ScanStats, WalkStep};
pub use scan::{listdir, scandir, scandir_with, ScanDir};
pub use sys::{NativeBackend, StdBackend, StdDir};
#[cfg(unix)]
pub use sys::{UnixBackend, UnixDir};
#[cfg(windows)]
pub use sys::{WindowsBackend, WindowsDir};
pub use traits::{Backend, BackendDir};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Walk the tree rooted at `top`.
///
/// Returns a [`WalkBuilder`] with the defaults: top-down, symlinks not
/// followed, no error hook, native backend. Nothing touches the filesystem
/// until iteration starts, and every iteration of a fresh builder opens
/// fresh handles.
pub fn walk<'a>(top: impl AsRef<Path>) -> WalkBuilder<'a> {
    WalkBuilder::new(top.as_ref().to_path_buf())
}
