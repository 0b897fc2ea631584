use std::fs::{self, ReadDir};
use std::path::Path;
use std::sync::Arc;

use crate::entry::{DirEntry, TypeHint};
use crate::error::WalkError;
use crate::traits::{Backend, BackendDir};

/// Enumeration through `std::fs::read_dir`.
///
/// Works on every platform std supports. The type hint comes from
/// `std::fs::DirEntry::file_type`, which is free where the OS reports it and
/// costs std a status call where it doesn't.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdBackend;

impl Backend for StdBackend {
    type Dir = StdDir;

    fn open(&self, path: &Path) -> Result<StdDir, WalkError> {
        let inner = fs::read_dir(path).map_err(|e| WalkError::from_io(path, &e))?;
        Ok(StdDir {
            dir: Arc::from(path),
            inner: Some(inner),
        })
    }
}

pub struct StdDir {
    dir: Arc<Path>,
    inner: Option<ReadDir>,
}

impl Iterator for StdDir {
    type Item = Result<DirEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.as_mut()?.next();
        match next {
            None => {
                self.inner = None;
                None
            }
            Some(Err(e)) => {
                self.inner = None;
                Some(Err(WalkError::from_io(&*self.dir, &e)))
            }
            Some(Ok(entry)) => {
                let hint = match entry.file_type() {
                    Ok(ft) if ft.is_symlink() => TypeHint::Symlink,
                    Ok(ft) if ft.is_dir() => TypeHint::Directory,
                    Ok(ft) if ft.is_file() => TypeHint::File,
                    _ => TypeHint::Unknown,
                };
                Some(Ok(DirEntry::new(Arc::clone(&self.dir), entry.file_name(), hint)))
            }
        }
    }
}

impl BackendDir for StdDir {
    fn close(&mut self) -> Result<(), WalkError> {
        // ReadDir closes its stream on drop and has no way to report failure.
        self.inner = None;
        Ok(())
    }
}
