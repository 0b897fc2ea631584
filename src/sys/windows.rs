use std::ffi::OsString;
use std::iter;
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::Path;
use std::sync::Arc;

use tracing::trace;
use windows_sys::Win32::Foundation::{
    GetLastError, ERROR_FILE_NOT_FOUND, ERROR_NO_MORE_FILES, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    FindClose, FindFirstFileW, FindNextFileW, FILE_ATTRIBUTE_DIRECTORY,
    FILE_ATTRIBUTE_REPARSE_POINT, WIN32_FIND_DATAW,
};
use windows_sys::Win32::System::SystemServices::IO_REPARSE_TAG_SYMLINK;

use crate::entry::{DirEntry, TypeHint};
use crate::error::WalkError;
use crate::traits::{Backend, BackendDir};

/// `FindFirstFileW` / `FindNextFileW` / `FindClose`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsBackend;

impl Backend for WindowsBackend {
    type Dir = WindowsDir;

    fn open(&self, path: &Path) -> Result<WindowsDir, WalkError> {
        WindowsDir::open(path)
    }
}

/// An open find handle.
///
/// `FindFirstFileW` already returns the first record, so the iterator keeps
/// it in `data` and only calls `FindNextFileW` once that one is consumed.
pub struct WindowsDir {
    dir: Arc<Path>,
    handle: Option<HANDLE>,
    data: Box<WIN32_FIND_DATAW>,
    pending: bool,
}

impl WindowsDir {
    fn open(path: &Path) -> Result<Self, WalkError> {
        let pattern: Vec<u16> = path
            .join("*")
            .as_os_str()
            .encode_wide()
            .chain(iter::once(0))
            .collect();

        // SAFETY: WIN32_FIND_DATAW is plain old data; all-zero is valid.
        let mut data: Box<WIN32_FIND_DATAW> = Box::new(unsafe { std::mem::zeroed() });
        let handle = unsafe { FindFirstFileW(pattern.as_ptr(), &mut *data) };

        if handle == INVALID_HANDLE_VALUE {
            let code = unsafe { GetLastError() };
            // The pattern matched nothing: an empty directory, not a failure.
            if code == ERROR_FILE_NOT_FOUND {
                return Ok(Self {
                    dir: Arc::from(path),
                    handle: None,
                    data,
                    pending: false,
                });
            }
            return Err(WalkError::from_raw_os_error(path, code as i32));
        }

        Ok(Self {
            dir: Arc::from(path),
            handle: Some(handle),
            data,
            pending: true,
        })
    }

    fn release(&mut self) {
        if let Err(e) = self.close() {
            trace!(path = %self.dir.display(), error = %e, "FindClose failed");
        }
    }
}

impl Iterator for WindowsDir {
    type Item = Result<DirEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let handle = self.handle?;

            if !self.pending {
                // SAFETY: `handle` is an open find handle owned by us.
                if unsafe { FindNextFileW(handle, &mut *self.data) } == 0 {
                    let code = unsafe { GetLastError() };
                    self.release();
                    if code == ERROR_NO_MORE_FILES {
                        return None;
                    }
                    return Some(Err(WalkError::from_raw_os_error(&*self.dir, code as i32)));
                }
            }
            self.pending = false;

            let raw = &self.data.cFileName;
            let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
            if matches!(&raw[..len], [0x2e] | [0x2e, 0x2e]) {
                continue;
            }
            let name = OsString::from_wide(&raw[..len]);

            let hint = type_hint(&self.data);
            return Some(Ok(DirEntry::new(Arc::clone(&self.dir), name, hint)));
        }
    }
}

impl BackendDir for WindowsDir {
    fn close(&mut self) -> Result<(), WalkError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        // SAFETY: taken out of `self.handle`, so this is the only close.
        if unsafe { FindClose(handle) } == 0 {
            return Err(WalkError::last_os_error(&self.dir));
        }
        Ok(())
    }
}

impl Drop for WindowsDir {
    fn drop(&mut self) {
        self.release();
    }
}

fn type_hint(data: &WIN32_FIND_DATAW) -> TypeHint {
    let attrs = data.dwFileAttributes;
    // dwReserved0 holds the reparse tag when the reparse bit is set.
    if attrs & FILE_ATTRIBUTE_REPARSE_POINT != 0 && data.dwReserved0 == IO_REPARSE_TAG_SYMLINK {
        TypeHint::Symlink
    } else if attrs & FILE_ATTRIBUTE_DIRECTORY != 0 {
        TypeHint::Directory
    } else {
        TypeHint::File
    }
}
