use std::cell::{Cell, OnceCell};
use std::ffi::{OsStr, OsString};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::error::WalkError;

/// One raw result of directory enumeration.
///
/// Holds the name exactly as the OS returned it plus whatever type
/// information came for free with the enumeration record. The full path is
/// joined on demand from the owning directory, which is shared by every
/// entry of the same scan.
///
/// Status queries are lazy and cached: [`symlink_metadata`] and [`metadata`]
/// each hit the filesystem at most once over the lifetime of the entry, and
/// the classifier methods ([`is_dir`], [`is_file`], [`is_symlink`]) only
/// query at all when the type hint cannot answer on its own.
///
/// [`symlink_metadata`]: DirEntry::symlink_metadata
/// [`metadata`]: DirEntry::metadata
/// [`is_dir`]: DirEntry::is_dir
/// [`is_file`]: DirEntry::is_file
/// [`is_symlink`]: DirEntry::is_symlink
#[derive(Debug)]
pub struct DirEntry {
    dir: Arc<Path>,
    name: OsString,
    hint: TypeHint,
    lstat: OnceCell<Result<Metadata, WalkError>>,
    stat: OnceCell<Result<Metadata, WalkError>>,
    queries: Cell<u32>,
}

/// Type information supplied by the OS during enumeration.
///
/// POSIX backends derive it from `d_type`, the Windows backend from the find
/// record's attribute bits. Filesystems that don't fill in a type produce
/// `Unknown`, as do special files (pipes, sockets, devices).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    /// No usable type information; the classifier must stat.
    Unknown,

    /// A regular file.
    File,

    /// A directory (never a symlink to one).
    Directory,

    /// A symbolic link, target type not known.
    Symlink,
}

impl DirEntry {
    pub(crate) fn new(dir: Arc<Path>, name: OsString, hint: TypeHint) -> Self {
        Self {
            dir,
            name,
            hint,
            lstat: OnceCell::new(),
            stat: OnceCell::new(),
            queries: Cell::new(0),
        }
    }

    /// The entry's name, never `.` or `..`.
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// Consume the entry, keeping only its name.
    pub fn into_name(self) -> OsString {
        self.name
    }

    /// The directory this entry was read from.
    pub fn parent(&self) -> &Path {
        &self.dir
    }

    /// Full path: the scanned directory joined with [`name`](Self::name).
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn type_hint(&self) -> TypeHint {
        self.hint
    }

    /// Number of status calls this entry has issued so far.
    pub fn status_queries(&self) -> u32 {
        self.queries.get()
    }

    // ── Classification ────────────────────────────────────────────────────

    /// Whether the entry is a directory.
    ///
    /// With `follow_symlinks`, a symlink counts as a directory when its
    /// target is one. An entry that vanished or became unreadable since it
    /// was enumerated is reported as not a directory.
    pub fn is_dir(&self, follow_symlinks: bool) -> bool {
        match self.hint {
            TypeHint::Directory => true,
            TypeHint::File => false,
            TypeHint::Symlink => follow_symlinks && self.target_is(Metadata::is_dir),
            TypeHint::Unknown => match self.symlink_metadata() {
                Ok(m) if m.file_type().is_symlink() => {
                    follow_symlinks && self.target_is(Metadata::is_dir)
                }
                Ok(m) => m.is_dir(),
                Err(_) => false,
            },
        }
    }

    /// Whether the entry is a regular file, same rules as [`is_dir`](Self::is_dir).
    pub fn is_file(&self, follow_symlinks: bool) -> bool {
        match self.hint {
            TypeHint::Directory => false,
            TypeHint::File => true,
            TypeHint::Symlink => follow_symlinks && self.target_is(Metadata::is_file),
            TypeHint::Unknown => match self.symlink_metadata() {
                Ok(m) if m.file_type().is_symlink() => {
                    follow_symlinks && self.target_is(Metadata::is_file)
                }
                Ok(m) => m.is_file(),
                Err(_) => false,
            },
        }
    }

    /// Whether the entry itself is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        match self.hint {
            TypeHint::Symlink => true,
            TypeHint::Directory | TypeHint::File => false,
            TypeHint::Unknown => self
                .symlink_metadata()
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false),
        }
    }

    fn target_is(&self, pred: fn(&Metadata) -> bool) -> bool {
        self.metadata().map(pred).unwrap_or(false)
    }

    // ── Status queries ────────────────────────────────────────────────────

    /// Link-status of the entry (does not traverse a final symlink).
    pub fn symlink_metadata(&self) -> Result<&Metadata, WalkError> {
        self.lstat
            .get_or_init(|| self.query(|p| fs::symlink_metadata(p)))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Resolved status of the entry (traverses symlinks).
    ///
    /// For an entry that is known not to be a symlink this reuses the
    /// link-status result instead of asking the OS again.
    pub fn metadata(&self) -> Result<&Metadata, WalkError> {
        self.stat
            .get_or_init(|| {
                let maybe_link = match self.hint {
                    TypeHint::Symlink => true,
                    TypeHint::Directory | TypeHint::File => false,
                    TypeHint::Unknown => match self.symlink_metadata() {
                        Ok(m) => m.file_type().is_symlink(),
                        // the follow-through query would fail the same way
                        Err(e) => return Err(e),
                    },
                };
                if maybe_link {
                    self.query(|p| fs::metadata(p))
                } else {
                    self.symlink_metadata().cloned()
                }
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    fn query(&self, stat: fn(&Path) -> std::io::Result<Metadata>) -> Result<Metadata, WalkError> {
        let path = self.path();
        self.queries.set(self.queries.get() + 1);
        trace!(path = %path.display(), hint = ?self.hint, "status query");
        stat(&path).map_err(|e| WalkError::from_io(&path, &e))
    }
}
