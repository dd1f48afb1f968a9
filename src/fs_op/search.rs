use std::fs;
use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};

use crate::fs_op::error::{FsOpError, Result};
use crate::fs_op::path::normalize_path;
use crate::fs_op::stat::assert_dir;

pub const DEFAULT_FILES_PATTERN: &str = "**/*.*";
pub const DEFAULT_DIRS_PATTERN: &str = "**/*";

fn list_entries(path: &Path, want_dir: bool) -> Result<Vec<PathBuf>> {
    assert_dir(path)?;
    let mut out = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.path().is_dir() == want_dir {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}

/// Files directly inside `path`, sorted.
pub fn list_files(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    list_entries(&normalize_path(path), false)
}

/// Directories directly inside `path`, sorted.
pub fn list_dirs(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    list_entries(&normalize_path(path), true)
}

fn search_paths(path: &Path, pattern: &str, want_dir: bool) -> Result<Vec<PathBuf>> {
    assert_dir(path)?;
    let base = Pattern::escape(&path.to_string_lossy());
    let full = format!("{}/{}", base.trim_end_matches('/'), pattern.trim_start_matches('/'));
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let entries = glob_with(&full, options)
        .map_err(|e| FsOpError::InvalidArgument(format!("invalid pattern {pattern:?}: {e}")))?;

    let mut out = Vec::new();
    for entry in entries {
        let p = entry.map_err(|e| FsOpError::Io(e.into()))?;
        if p.is_dir() == want_dir && p != path {
            out.push(p);
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

/// Files below `path` matching the glob `pattern` (`**` spans directories).
pub fn search_files(path: impl AsRef<Path>, pattern: &str) -> Result<Vec<PathBuf>> {
    search_paths(&normalize_path(path), pattern, false)
}

/// Directories below `path` matching the glob `pattern`.
pub fn search_dirs(path: impl AsRef<Path>, pattern: &str) -> Result<Vec<PathBuf>> {
    search_paths(&normalize_path(path), pattern, true)
}
