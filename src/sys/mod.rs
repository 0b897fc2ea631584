//! Platform directory iterators.
//!
//! The native backend is chosen at compile time: `opendir`/`readdir_r`/
//! `closedir` on POSIX targets (except 32-bit glibc), `FindFirstFileW`/`FindNextFileW`/`FindClose`
//! on Windows. Anything else falls back to `std::fs::read_dir`, which is also
//! available everywhere as [`StdBackend`].

use std::io;

mod portable;
#[cfg(unix)]
#[allow(unsafe_code)]
mod unix;
#[cfg(windows)]
#[allow(unsafe_code)]
mod windows;

pub use portable::{StdBackend, StdDir};
#[cfg(unix)]
pub use unix::{UnixBackend, UnixDir};
#[cfg(windows)]
pub use windows::{WindowsBackend, WindowsDir};

/// The enumeration backend for the target platform.
#[cfg(all(unix, not(all(target_os = "linux", target_env = "gnu", target_pointer_width = "32"))))]
pub type NativeBackend = UnixBackend;

/// The enumeration backend for the target platform.
///
/// 32-bit glibc's plain `readdir_r` fails with `EOVERFLOW` on 64-bit inode
/// numbers; std reads through `readdir64` there.
#[cfg(all(target_os = "linux", target_env = "gnu", target_pointer_width = "32"))]
pub type NativeBackend = StdBackend;

/// The enumeration backend for the target platform.
#[cfg(windows)]
pub type NativeBackend = WindowsBackend;

/// The enumeration backend for the target platform.
#[cfg(not(any(unix, windows)))]
pub type NativeBackend = StdBackend;

/// Sort a native error code into the not-found / permission / not-a-directory
/// buckets. `None` means the code gets wrapped as-is.
#[cfg(unix)]
pub(crate) fn classify_os_error(code: i32) -> Option<io::ErrorKind> {
    match code {
        libc::ENOENT => Some(io::ErrorKind::NotFound),
        libc::EACCES | libc::EPERM => Some(io::ErrorKind::PermissionDenied),
        libc::ENOTDIR => Some(io::ErrorKind::NotADirectory),
        _ => None,
    }
}

#[cfg(windows)]
pub(crate) fn classify_os_error(code: i32) -> Option<io::ErrorKind> {
    use windows_sys::Win32::Foundation::{
        ERROR_ACCESS_DENIED, ERROR_DIRECTORY, ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND,
    };

    match code as u32 {
        ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => Some(io::ErrorKind::NotFound),
        ERROR_ACCESS_DENIED => Some(io::ErrorKind::PermissionDenied),
        ERROR_DIRECTORY => Some(io::ErrorKind::NotADirectory),
        _ => None,
    }
}

#[cfg(not(any(unix, windows)))]
pub(crate) fn classify_os_error(code: i32) -> Option<io::ErrorKind> {
    match io::Error::from_raw_os_error(code).kind() {
        kind @ (io::ErrorKind::NotFound
        | io::ErrorKind::PermissionDenied
        | io::ErrorKind::NotADirectory) => Some(kind),
        _ => None,
    }
}
