//! Existence and kind checks.
//!
//! Nothing here is cached: every call stats the live filesystem. The
//! `assert_*` forms return a descriptive [`FsOpError`] instead of a bool so
//! higher-level operations can validate all of their inputs before they
//! mutate anything.

use std::fs;
use std::path::Path;

use crate::fs_op::error::{FsOpError, Result};
use crate::fs_op::path::normalize_path;

/// Lightweight classification of a filesystem path's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    /// The path does not exist.
    NotFound,
    /// The path exists and is a directory.
    Directory,
    /// The path exists and is a regular file.
    File,
    /// The path exists but is neither a regular file nor a directory
    /// (for example: socket, FIFO, block device).
    Other,
}

impl PathType {
    /// Classify `path` with a single `stat` call (symlinks are followed).
    pub fn of<P: AsRef<Path>>(path: P) -> Self {
        match fs::metadata(path.as_ref()) {
            Err(_) => PathType::NotFound,
            Ok(md) if md.is_dir() => PathType::Directory,
            Ok(md) if md.is_file() => PathType::File,
            Ok(_) => PathType::Other,
        }
    }
}

/// Return `true` if the provided `path` exists.
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    PathType::of(path) != PathType::NotFound
}

/// Return `true` if the provided `path` is a directory.
pub fn is_dir<P: AsRef<Path>>(path: P) -> bool {
    PathType::of(path) == PathType::Directory
}

/// Return `true` if the provided `path` is a regular file.
pub fn is_file<P: AsRef<Path>>(path: P) -> bool {
    PathType::of(path) == PathType::File
}

/// `true` when `path` is an empty directory or a zero-length file.
pub fn is_empty<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = normalize_path(path);
    assert_exists(&path)?;
    if is_dir(&path) {
        is_empty_dir(&path)
    } else {
        is_empty_file(&path)
    }
}

/// `true` when `path` is a directory with no entries.
pub fn is_empty_dir<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = normalize_path(path);
    assert_dir(&path)?;
    Ok(fs::read_dir(&path)?.next().is_none())
}

/// `true` when `path` is a file of zero length.
pub fn is_empty_file<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = normalize_path(path);
    assert_file(&path)?;
    Ok(fs::metadata(&path)?.len() == 0)
}

/// Fail with `NotFound` unless `path` exists.
pub fn assert_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let p = path.as_ref();
    if exists(p) {
        Ok(())
    } else {
        Err(FsOpError::NotFound(p.to_path_buf()))
    }
}

/// Fail unless `path` is an existing directory.
pub fn assert_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let p = path.as_ref();
    match PathType::of(p) {
        PathType::Directory => Ok(()),
        PathType::NotFound => Err(FsOpError::NotFound(p.to_path_buf())),
        _ => Err(FsOpError::invalid_kind(p, "expected a directory")),
    }
}

/// Fail unless `path` is an existing regular file.
pub fn assert_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let p = path.as_ref();
    match PathType::of(p) {
        PathType::File => Ok(()),
        PathType::NotFound => Err(FsOpError::NotFound(p.to_path_buf())),
        _ => Err(FsOpError::invalid_kind(p, "expected a file")),
    }
}

/// Fail if anything already exists at `path`.
pub fn assert_not_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let p = path.as_ref();
    if exists(p) {
        Err(FsOpError::invalid_kind(p, "item already exists"))
    } else {
        Ok(())
    }
}

/// Fail if `path` is a directory; a missing path passes.
pub fn assert_not_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let p = path.as_ref();
    if is_dir(p) {
        Err(FsOpError::invalid_kind(p, "directory already exists"))
    } else {
        Ok(())
    }
}

/// Fail if `path` is a regular file; a missing path passes.
pub fn assert_not_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let p = path.as_ref();
    if is_file(p) {
        Err(FsOpError::invalid_kind(p, "file already exists"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn path_type_nonexistent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("no_such_file_hopefully");
        assert_eq!(PathType::of(&p), PathType::NotFound);
        assert!(!exists(&p));
        assert!(!is_file(&p));
        assert!(!is_dir(&p));
        assert!(matches!(assert_exists(&p), Err(FsOpError::NotFound(_))));
        assert!(matches!(is_empty(&p), Err(FsOpError::NotFound(_))));
    }

    #[test]
    fn path_type_file_and_dir() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, b"hello").unwrap();
        assert_eq!(PathType::of(&file), PathType::File);
        assert!(is_file(&file));
        assert!(!is_empty(&file).unwrap());

        let dir = tmp.path().join("subdir");
        fs::create_dir(&dir).unwrap();
        assert_eq!(PathType::of(&dir), PathType::Directory);
        assert!(is_dir(&dir));
        assert!(is_empty(&dir).unwrap());
    }

    #[test]
    fn empty_checks_reject_wrong_kind() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("empty.txt");
        fs::write(&file, b"").unwrap();
        assert!(is_empty_file(&file).unwrap());
        assert!(matches!(
            is_empty_dir(&file),
            Err(FsOpError::InvalidPathKind { .. })
        ));
        assert!(matches!(
            is_empty_file(tmp.path()),
            Err(FsOpError::InvalidPathKind { .. })
        ));
    }

    #[test]
    fn assertions_report_kind() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("f.txt");
        fs::write(&file, b"x").unwrap();

        assert!(assert_file(&file).is_ok());
        assert!(assert_not_dir(&file).is_ok());
        assert!(matches!(
            assert_dir(&file),
            Err(FsOpError::InvalidPathKind { .. })
        ));
        assert!(matches!(
            assert_not_file(&file),
            Err(FsOpError::InvalidPathKind { .. })
        ));
        assert!(matches!(
            assert_not_exists(&file),
            Err(FsOpError::InvalidPathKind { .. })
        ));
        assert!(matches!(
            assert_not_dir(tmp.path()),
            Err(FsOpError::InvalidPathKind { .. })
        ));
    }
}
