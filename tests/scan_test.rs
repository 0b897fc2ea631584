use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io;

use scanwalk::{listdir, scandir, scandir_with, DirEntry, StdBackend, TypeHint, WalkError};

fn setup_flat_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    for name in ["a.txt", "b.txt", "c.log", ".hidden"] {
        fs::write(root.join(name), name).unwrap();
    }
    fs::create_dir(root.join("sub")).unwrap();
    fs::create_dir(root.join("..dots")).unwrap();

    dir
}

fn collect(dir: &std::path::Path) -> Vec<DirEntry> {
    scandir(dir).unwrap().map(Result::unwrap).collect()
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

#[test]
fn listdir_matches_read_dir() {
    let dir = setup_flat_dir();

    let ours: BTreeSet<OsString> = listdir(dir.path()).unwrap().into_iter().collect();
    let std: BTreeSet<OsString> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();

    assert_eq!(ours, std);
    assert!(!ours.contains(&OsString::from(".")));
    assert!(!ours.contains(&OsString::from("..")));
    assert!(ours.contains(&OsString::from("..dots")));
}

#[test]
fn empty_directory_scans_to_nothing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(listdir(dir.path()).unwrap().is_empty());
}

#[test]
fn std_backend_lists_same_names() {
    let dir = setup_flat_dir();

    let native: BTreeSet<OsString> = listdir(dir.path()).unwrap().into_iter().collect();
    let portable: BTreeSet<OsString> = scandir_with(&StdBackend, dir.path())
        .unwrap()
        .map(|e| e.unwrap().into_name())
        .collect();

    assert_eq!(native, portable);
}

#[test]
fn entry_paths_join_the_scanned_directory() {
    let dir = setup_flat_dir();
    for entry in collect(dir.path()) {
        assert_eq!(entry.parent(), dir.path());
        assert_eq!(entry.path(), dir.path().join(entry.name()));
    }
}

#[test]
fn missing_directory_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone");

    let err = scandir(&missing).err().unwrap();
    assert_eq!(err, WalkError::NotFound(missing.clone()));
    assert_eq!(err.path(), missing);
}

#[cfg(unix)]
#[test]
fn file_is_not_a_directory() {
    let dir = setup_flat_dir();
    let file = dir.path().join("a.txt");

    let err = scandir(&file).err().unwrap();
    assert_eq!(err, WalkError::NotADirectory(file));
}

#[test]
fn early_close_releases_the_handle() {
    let dir = setup_flat_dir();

    let mut scan = scandir(dir.path()).unwrap();
    assert!(scan.next().is_some());
    scan.close().unwrap();

    // a fresh scan still sees everything
    assert_eq!(listdir(dir.path()).unwrap().len(), 6);
}

#[cfg(unix)]
#[test]
fn longest_names_come_back_whole() {
    let dir = setup_flat_dir();
    let long_file = "x".repeat(255);
    let long_dir = "d".repeat(254);
    fs::write(dir.path().join(&long_file), "long").unwrap();
    fs::create_dir(dir.path().join(&long_dir)).unwrap();

    let native: BTreeSet<OsString> = scandir_with(&scanwalk::UnixBackend, dir.path())
        .unwrap()
        .map(|e| e.unwrap().into_name())
        .collect();
    let listed: BTreeSet<OsString> = listdir(dir.path()).unwrap().into_iter().collect();

    for names in [&native, &listed] {
        assert!(names.contains(&OsString::from(&long_file)));
        assert!(names.contains(&OsString::from(&long_dir)));
        assert_eq!(names.len(), 8);
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn classifies_files_and_directories() {
    let dir = setup_flat_dir();

    for entry in collect(dir.path()) {
        let is_sub = entry.name() == "sub" || entry.name() == "..dots";
        assert_eq!(entry.is_dir(false), is_sub, "{:?}", entry.name());
        assert_eq!(entry.is_dir(true), is_sub, "{:?}", entry.name());
        assert_eq!(entry.is_file(false), !is_sub, "{:?}", entry.name());
        assert!(!entry.is_symlink());
    }
}

#[test]
fn hinted_entries_need_no_status_query() {
    let dir = setup_flat_dir();

    for entry in collect(dir.path()) {
        if entry.type_hint() == TypeHint::Unknown {
            continue;
        }
        entry.is_dir(true);
        entry.is_dir(false);
        entry.is_symlink();
        assert_eq!(entry.status_queries(), 0, "{:?}", entry.name());
    }
}

#[test]
fn status_is_queried_at_most_once_per_mode() {
    let dir = setup_flat_dir();

    for entry in collect(dir.path()) {
        for _ in 0..3 {
            entry.is_dir(true);
            entry.is_file(false);
            entry.is_symlink();
            entry.symlink_metadata().unwrap();
            entry.metadata().unwrap();
        }
        // non-links reuse the link-status result for the resolved one
        assert_eq!(entry.status_queries(), 1, "{:?}", entry.name());
    }
}

#[test]
fn vanished_entry_is_not_a_directory() {
    let dir = setup_flat_dir();
    let entries = collect(dir.path());

    fs::remove_file(dir.path().join("a.txt")).unwrap();
    fs::remove_dir(dir.path().join("..dots")).unwrap();
    fs::write(dir.path().join("..dots"), "now a file").unwrap();

    let gone = entries.iter().find(|e| e.name() == "a.txt").unwrap();
    assert!(!gone.is_dir(true));
    assert!(!gone.is_symlink());
    assert!(matches!(gone.symlink_metadata(), Err(WalkError::NotFound(_))));

    let metadata = entries
        .iter()
        .find(|e| e.name() == "..dots")
        .unwrap()
        .metadata()
        .unwrap();
    assert!(metadata.is_file(), "status reflects the replacement");
}

#[cfg(unix)]
#[test]
fn symlinks_are_classified_by_target_only_when_following() {
    use std::os::unix::fs::symlink;

    let dir = setup_flat_dir();
    let root = dir.path();
    symlink(root.join("sub"), root.join("to_dir")).unwrap();
    symlink(root.join("a.txt"), root.join("to_file")).unwrap();
    symlink(root.join("nowhere"), root.join("dangling")).unwrap();

    let entries = collect(root);
    let get = |name: &str| entries.iter().find(|e| e.name() == name).unwrap();

    let to_dir = get("to_dir");
    assert!(to_dir.is_symlink());
    assert!(!to_dir.is_dir(false));
    assert!(to_dir.is_dir(true));
    assert!(to_dir.status_queries() <= 2);

    let to_file = get("to_file");
    assert!(to_file.is_symlink());
    assert!(!to_file.is_file(false));
    assert!(to_file.is_file(true));

    let dangling = get("dangling");
    assert!(dangling.is_symlink());
    assert!(!dangling.is_dir(true));
    assert!(!dangling.is_file(true));
    assert!(matches!(dangling.metadata(), Err(WalkError::NotFound(_))));
    assert!(dangling.symlink_metadata().unwrap().file_type().is_symlink());
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[test]
fn io_errors_map_onto_the_taxonomy() {
    let not_found = io::Error::from(io::ErrorKind::NotFound);
    assert_eq!(
        WalkError::from_io("x", &not_found),
        WalkError::NotFound("x".into())
    );

    let denied = io::Error::from(io::ErrorKind::PermissionDenied);
    assert_eq!(
        WalkError::from_io("x", &denied),
        WalkError::PermissionDenied("x".into())
    );

    let other = WalkError::from_io("x", &io::Error::from(io::ErrorKind::Interrupted));
    assert_eq!(other.raw_os_error(), None);
}

#[cfg(unix)]
#[test]
fn native_codes_map_onto_the_taxonomy() {
    assert_eq!(
        WalkError::from_raw_os_error("x", libc::ENOENT),
        WalkError::NotFound("x".into())
    );
    assert_eq!(
        WalkError::from_raw_os_error("x", libc::EACCES),
        WalkError::PermissionDenied("x".into())
    );
    assert_eq!(
        WalkError::from_raw_os_error("x", libc::ENOTDIR),
        WalkError::NotADirectory("x".into())
    );

    let busy = WalkError::from_raw_os_error("x", libc::EBUSY);
    assert_eq!(busy.raw_os_error(), Some(libc::EBUSY));
    assert_eq!(io::Error::from(busy).raw_os_error(), Some(libc::EBUSY));
}

#[test]
fn converts_back_into_io_error() {
    let err: io::Error = WalkError::PermissionDenied("x".into()).into();
    assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
}

