use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::fs_op::error::Result;
use crate::fs_op::path::normalize_path;
use crate::fs_op::search::{list_dirs, list_files};
use crate::fs_op::stat::{assert_dir, assert_file, exists, is_empty_dir, is_empty_file};

/// Remove the file at `path`.
///
/// A missing path is not an error: the function returns `Ok(false)` so
/// callers can attempt removal without checking for existence first.
/// Returns `Ok(true)` when the file is gone afterwards.
pub fn remove_file(path: impl AsRef<Path>) -> Result<bool> {
    let p = normalize_path(path);
    if !exists(&p) {
        return Ok(false);
    }
    assert_file(&p)?;
    fs::remove_file(&p)?;
    Ok(!exists(&p))
}

/// Remove the directory at `path` with all of its content. Same return
/// convention as [`remove_file`].
pub fn remove_dir(path: impl AsRef<Path>) -> Result<bool> {
    let p = normalize_path(path);
    if !exists(&p) {
        return Ok(false);
    }
    assert_dir(&p)?;
    fs::remove_dir_all(&p)?;
    Ok(!exists(&p))
}

/// [`remove_file`] for each path, stopping at the first error.
pub fn remove_files<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    for p in paths {
        remove_file(p)?;
    }
    Ok(())
}

/// [`remove_dir`] for each path, stopping at the first error.
pub fn remove_dirs<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    for p in paths {
        remove_dir(p)?;
    }
    Ok(())
}

/// Empty the directory at `path` while keeping the directory itself.
pub fn remove_dir_content(path: impl AsRef<Path>) -> Result<()> {
    let p = normalize_path(path);
    assert_dir(&p)?;
    remove_dirs(&list_dirs(&p)?)?;
    remove_files(&list_files(&p)?)?;
    Ok(())
}

/// Remove empty files (`files`) and then empty directories (`dirs`) found
/// below `path`. Directories are visited deepest first so that a directory
/// emptied by the cleanup is removed as well.
pub fn clean_dir(path: impl AsRef<Path>, dirs: bool, files: bool) -> Result<()> {
    let p = normalize_path(path);
    assert_dir(&p)?;
    if files {
        for entry in WalkDir::new(&p).min_depth(1).contents_first(true) {
            let entry = entry?;
            if entry.file_type().is_file() && is_empty_file(entry.path())? {
                remove_file(entry.path())?;
            }
        }
    }
    if dirs {
        for entry in WalkDir::new(&p).min_depth(1).contents_first(true) {
            let entry = entry?;
            if entry.file_type().is_dir() && is_empty_dir(entry.path())? {
                remove_dir(entry.path())?;
            }
        }
    }
    Ok(())
}

/// Alias of [`remove_file`].
pub fn delete_file(path: impl AsRef<Path>) -> Result<bool> {
    remove_file(path)
}

/// Alias of [`remove_files`].
pub fn delete_files<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    remove_files(paths)
}

/// Alias of [`remove_dir`].
pub fn delete_dir(path: impl AsRef<Path>) -> Result<bool> {
    remove_dir(path)
}

/// Alias of [`remove_dirs`].
pub fn delete_dirs<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    remove_dirs(paths)
}

/// Alias of [`remove_dir_content`].
pub fn delete_dir_content(path: impl AsRef<Path>) -> Result<()> {
    remove_dir_content(path)
}
