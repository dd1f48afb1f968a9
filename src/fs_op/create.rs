use std::fs;
use std::path::Path;

use crate::fs_op::error::Result;
use crate::fs_op::io::{write_file, WriteOptions};
use crate::fs_op::path::normalize_path;
use crate::fs_op::stat::{assert_not_dir, assert_not_exists, assert_not_file, is_dir, is_file};

/// Create `path` and any missing parents.
///
/// Idempotent and safe when another thread or process creates the same
/// directory concurrently. Fails with `InvalidPathKind` only when a file
/// occupies `path`.
pub fn make_dirs(path: impl AsRef<Path>) -> Result<()> {
    let path = normalize_path(path);
    if is_dir(&path) {
        return Ok(());
    }
    assert_not_file(&path)?;
    match fs::create_dir_all(&path) {
        Ok(()) => Ok(()),
        // Lost a race against a concurrent creator: fine if it made a dir.
        Err(_) if is_dir(&path) => Ok(()),
        Err(e) => {
            assert_not_file(&path)?;
            Err(e.into())
        }
    }
}

/// Create the parent directories needed to hold the file at `path`.
pub fn make_dirs_for_file(path: impl AsRef<Path>) -> Result<()> {
    let path = normalize_path(path);
    if is_file(&path) {
        return Ok(());
    }
    assert_not_dir(&path)?;
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => make_dirs(parent),
        _ => Ok(()),
    }
}

/// Create a directory at `path`. Unless `overwrite`, an existing entry is an
/// error.
pub fn create_dir(path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
    let path = normalize_path(path);
    assert_not_file(&path)?;
    if !overwrite {
        assert_not_exists(&path)?;
    }
    make_dirs(&path)
}

/// Create a file at `path` holding `content`. Unless `overwrite`, an
/// existing entry is an error.
pub fn create_file(path: impl AsRef<Path>, content: &str, overwrite: bool) -> Result<()> {
    let path = normalize_path(path);
    assert_not_dir(&path)?;
    if !overwrite {
        assert_not_exists(&path)?;
    }
    write_file(&path, content, &WriteOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_op::error::FsOpError;
    use rayon::prelude::*;
    use tempfile::tempdir;

    #[test]
    fn create_file_and_dir() {
        let td = tempdir().unwrap();
        let dir = td.path().join("a/b");
        let file = dir.join("f.txt");
        create_dir(&dir, false).unwrap();
        create_file(&file, "hello", false).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "hello");

        assert!(matches!(
            create_file(&file, "again", false),
            Err(FsOpError::InvalidPathKind { .. })
        ));
        create_file(&file, "again", true).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "again");
        assert!(create_dir(&dir, false).is_err());
        assert!(create_dir(&dir, true).is_ok());
    }

    #[test]
    fn make_dirs_rejects_file_in_the_way() {
        let td = tempdir().unwrap();
        let file = td.path().join("occupied");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            make_dirs(&file),
            Err(FsOpError::InvalidPathKind { .. })
        ));
        assert!(matches!(
            make_dirs_for_file(td.path()),
            Err(FsOpError::InvalidPathKind { .. })
        ));
    }

    #[test]
    fn make_dirs_tolerates_concurrent_creators() {
        let td = tempdir().unwrap();
        let target = td.path().join("x/y/z");
        (0..32).into_par_iter().for_each(|_| {
            make_dirs(&target).expect("concurrent make_dirs");
        });
        assert!(target.is_dir());
    }
}
