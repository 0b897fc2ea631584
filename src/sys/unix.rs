use std::ffi::{c_char, CStr, CString, OsStr};
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr::{self, NonNull};
use std::sync::Arc;

use tracing::trace;

use crate::entry::{DirEntry, TypeHint};
use crate::error::WalkError;
use crate::traits::{Backend, BackendDir};

/// `opendir` / `readdir_r` / `closedir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixBackend;

impl Backend for UnixBackend {
    type Dir = UnixDir;

    fn open(&self, path: &Path) -> Result<UnixDir, WalkError> {
        UnixDir::open(path)
    }
}

// Used when the filesystem won't say how long its names can get.
const FALLBACK_NAME_MAX: usize = 1024;

// The entry buffer is a `Vec<u64>`, so dirent must not need more alignment.
const _: () = assert!(mem::align_of::<libc::dirent>() <= mem::align_of::<u64>());

/// An open `DIR*` stream.
///
/// Each stream owns its own `dirent` buffer and is read with `readdir_r`, so
/// independently opened streams never share state. `libc::dirent` declares
/// `d_name` too short on some platforms, so the buffer is sized from the
/// directory's `_PC_NAME_MAX` instead of from the struct.
pub struct UnixDir {
    dir: Arc<Path>,
    handle: Option<NonNull<libc::DIR>>,
    buf: Vec<u64>,
}

impl UnixDir {
    fn open(path: &Path) -> Result<Self, WalkError> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| WalkError::from_raw_os_error(path, libc::EINVAL))?;

        let raw = unsafe { libc::opendir(c_path.as_ptr()) };
        let handle = NonNull::new(raw).ok_or_else(|| WalkError::last_os_error(path))?;

        Ok(Self {
            dir: Arc::from(path),
            handle: Some(handle),
            buf: dirent_buffer(handle),
        })
    }

    /// Close after exhaustion or a read error. Nothing is left to report the
    /// failure to, so it only gets logged.
    fn release(&mut self) {
        if let Err(e) = self.close() {
            trace!(path = %self.dir.display(), error = %e, "closedir failed");
        }
    }
}

impl Iterator for UnixDir {
    type Item = Result<DirEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let handle = self.handle?;
            let entry = self.buf.as_mut_ptr().cast::<libc::dirent>();
            let mut result: *mut libc::dirent = ptr::null_mut();

            // SAFETY: `handle` is an open stream owned by us; `entry` points
            // at a suitably aligned buffer with room for NAME_MAX + 1 name bytes.
            #[allow(deprecated)]
            let rc = unsafe { libc::readdir_r(handle.as_ptr(), entry, &mut result) };
            if rc != 0 {
                let err = WalkError::from_raw_os_error(&*self.dir, rc);
                self.release();
                return Some(Err(err));
            }
            if result.is_null() {
                self.release();
                return None;
            }

            // SAFETY: readdir_r filled `entry` and NUL-terminated d_name
            // inside `buf`. The pointer is taken from the whole buffer, not
            // from the declared d_name array, which may be shorter.
            let name = unsafe { CStr::from_ptr(ptr::addr_of!((*entry).d_name).cast::<c_char>()) };
            let name = name.to_bytes();
            if name == b"." || name == b".." {
                continue;
            }

            let hint = type_hint(entry);
            let name = OsStr::from_bytes(name).to_os_string();
            return Some(Ok(DirEntry::new(Arc::clone(&self.dir), name, hint)));
        }
    }
}

impl BackendDir for UnixDir {
    fn close(&mut self) -> Result<(), WalkError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        // SAFETY: taken out of `self.handle`, so this is the only close.
        if unsafe { libc::closedir(handle.as_ptr()) } != 0 {
            return Err(WalkError::last_os_error(&self.dir));
        }
        Ok(())
    }
}

impl Drop for UnixDir {
    fn drop(&mut self) {
        self.release();
    }
}

/// Zeroed storage for one `dirent` carrying the longest name `handle`'s
/// filesystem allows.
fn dirent_buffer(handle: NonNull<libc::DIR>) -> Vec<u64> {
    // SAFETY: `handle` is an open stream.
    let name_max = unsafe { libc::fpathconf(libc::dirfd(handle.as_ptr()), libc::_PC_NAME_MAX) };
    let name_max = usize::try_from(name_max).unwrap_or(FALLBACK_NAME_MAX);

    let bytes = mem::size_of::<libc::dirent>()
        .max(mem::offset_of!(libc::dirent, d_name) + name_max + 1);
    vec![0u64; bytes.div_ceil(mem::size_of::<u64>())]
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly",
))]
fn type_hint(entry: *const libc::dirent) -> TypeHint {
    // SAFETY: called only on an entry readdir_r just filled.
    match unsafe { (*entry).d_type } {
        libc::DT_DIR => TypeHint::Directory,
        libc::DT_REG => TypeHint::File,
        libc::DT_LNK => TypeHint::Symlink,
        _ => TypeHint::Unknown,
    }
}

// No d_type on this platform.
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly",
)))]
fn type_hint(_entry: *const libc::dirent) -> TypeHint {
    TypeHint::Unknown
}
