//! Path normalization and name parsing.
//!
//! Every public entry point in `fs_op` funnels its path arguments through
//! [`normalize_path`] before touching the filesystem, so callers can pass
//! `&str`, `String`, `&Path` or `PathBuf` interchangeably.

use std::path::{Component, Path, PathBuf};

use crate::fs_op::error::{FsOpError, Result};

/// Lexically normalize `path`: collapse `.` and `..` components, duplicate
/// separators and any trailing separator. The filesystem is not consulted,
/// so symlinks are not resolved. An empty path normalizes to `.`.
pub fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let mut out = PathBuf::new();
    // Number of `Normal` components currently on `out` that `..` may pop.
    let mut depth = 0usize;
    let mut rooted = false;
    for comp in path.as_ref().components() {
        match comp {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => {
                out.push(comp.as_os_str());
                rooted = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                } else if !rooted {
                    out.push("..");
                }
            }
            Component::Normal(name) => {
                out.push(name);
                depth += 1;
            }
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Return the last component of `path`, which may also be a URL; query
/// string and fragment of a URL are ignored.
pub fn get_filename(path: impl AsRef<Path>) -> String {
    let raw = path.as_ref().to_string_lossy().into_owned();
    let without_query = match raw.find("://") {
        Some(scheme_end) => {
            let rest = &raw[scheme_end + 3..];
            let rest = rest.split(['?', '#']).next().unwrap_or_default();
            // Drop the authority, keep only the url path.
            match rest.find('/') {
                Some(i) => rest[i..].to_string(),
                None => String::new(),
            }
        }
        None => raw,
    };
    without_query
        .rsplit(|c: char| c == '/' || c == std::path::MAIN_SEPARATOR)
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Split a filename into `(basename, extension)`. The extension is returned
/// without its dot; dot-files such as `.bashrc` have no extension.
pub fn split_filename(path: impl AsRef<Path>) -> (String, String) {
    let filename = get_filename(path);
    let leading_dots = filename.len() - filename.trim_start_matches('.').len();
    match filename[leading_dots..].rfind('.') {
        Some(i) => {
            let split = leading_dots + i;
            let extension = filename[split..].replace('.', "").trim().to_string();
            (filename[..split].to_string(), extension)
        }
        None => (filename, String::new()),
    }
}

/// Split a path into its parent directory and filename.
pub fn split_filepath(path: impl AsRef<Path>) -> (PathBuf, String) {
    let path = normalize_path(path);
    let dirpath = match path.parent() {
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::new(),
    };
    (dirpath, get_filename(&path))
}

/// Split a path into its non-empty named components.
pub fn split_path(path: impl AsRef<Path>) -> Vec<String> {
    normalize_path(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

pub fn get_file_basename(path: impl AsRef<Path>) -> String {
    split_filename(path).0
}

pub fn get_file_extension(path: impl AsRef<Path>) -> String {
    split_filename(path).1
}

/// Build a filename from `basename` and `extension`, tolerating stray dots.
pub fn join_filename(basename: &str, extension: &str) -> String {
    let basename = basename.trim_end_matches('.').trim();
    let extension = extension.replace('.', "");
    let extension = extension.trim();
    match (basename.is_empty(), extension.is_empty()) {
        (false, false) => format!("{basename}.{extension}"),
        (false, true) => basename.to_string(),
        _ => extension.to_string(),
    }
}

pub fn join_filepath(dirpath: impl AsRef<Path>, filename: &str) -> PathBuf {
    join_path(dirpath, &[filename])
}

/// Join `parts` onto `base`. Leading separators on the parts are ignored so
/// they never reset the result to the filesystem root.
pub fn join_path<S: AsRef<str>>(base: impl AsRef<Path>, parts: &[S]) -> PathBuf {
    let mut out = base.as_ref().to_path_buf();
    for part in parts {
        out.push(part.as_ref().trim_start_matches(['/', '\\']));
    }
    normalize_path(out)
}

/// Walk `levels` directories up from `path` (at least one).
pub fn get_parent_dir(path: impl AsRef<Path>, levels: usize) -> PathBuf {
    let ups = vec![".."; levels.max(1)];
    join_path(path, &ups)
}

/// How [`transform_filepath`] should treat one part of a path.
pub enum Change<'a> {
    Keep,
    Set(&'a str),
    Map(&'a dyn Fn(&str) -> String),
}

impl Change<'_> {
    fn apply(&self, old: &str) -> String {
        match self {
            Change::Keep => old.to_string(),
            Change::Set(v) => (*v).to_string(),
            Change::Map(f) => f(old),
        }
    }

    fn is_keep(&self) -> bool {
        matches!(self, Change::Keep)
    }
}

/// Rebuild `path` with a new directory, basename and/or extension.
pub fn transform_filepath(
    path: impl AsRef<Path>,
    dirpath: Change<'_>,
    basename: Change<'_>,
    extension: Change<'_>,
) -> Result<PathBuf> {
    if dirpath.is_keep() && basename.is_keep() && extension.is_keep() {
        return Err(FsOpError::InvalidArgument(
            "at least one of dirpath, basename or extension must change".into(),
        ));
    }
    let (old_dir, old_filename) = split_filepath(path);
    let (old_base, old_ext) = split_filename(&old_filename);
    let new_dir = dirpath.apply(&old_dir.to_string_lossy());
    let new_base = basename.apply(&old_base);
    let new_ext = extension.apply(&old_ext);
    if new_dir.is_empty() && new_base.is_empty() && new_ext.is_empty() {
        return Err(FsOpError::InvalidArgument(
            "transformed path would be empty".into(),
        ));
    }
    Ok(join_filepath(new_dir, &join_filename(&new_base, &new_ext)))
}
