use std::fs;
use std::path::Path;

use crate::fs_op::create::{make_dirs, make_dirs_for_file};
use crate::fs_op::error::{FsOpError, Result};
use crate::fs_op::helpers::rename_or_copy;
use crate::fs_op::path::{
    get_file_basename, get_file_extension, get_filename, join_filename, normalize_path,
};
use crate::fs_op::remove::remove_dir;
use crate::fs_op::stat::{
    assert_dir, assert_file, assert_not_dir, assert_not_exists, assert_not_file, exists,
};

/// Move the file at `path` into the directory `dest`.
///
/// Falls back to copy + remove when a plain rename is not possible (e.g. a
/// cross-filesystem move). Unless `overwrite`, an existing `dest/<name>` is
/// an error.
pub fn move_file(path: impl AsRef<Path>, dest: impl AsRef<Path>, overwrite: bool) -> Result<()> {
    let path = normalize_path(path);
    let dest = normalize_path(dest);
    assert_file(&path)?;
    assert_not_file(&dest)?;
    let target = dest.join(get_filename(&path));
    assert_not_dir(&target)?;
    if !overwrite {
        assert_not_exists(&target)?;
    }
    make_dirs_for_file(&target)?;
    rename_or_copy(&path, &target)?;
    Ok(())
}

/// Move the directory at `path` into the directory `dest`.
pub fn move_dir(path: impl AsRef<Path>, dest: impl AsRef<Path>, overwrite: bool) -> Result<()> {
    let path = normalize_path(path);
    let dest = normalize_path(dest);
    assert_dir(&path)?;
    assert_not_file(&dest)?;
    let target = dest.join(get_filename(&path));
    if exists(&target) {
        if !overwrite {
            return Err(FsOpError::invalid_kind(&target, "item already exists"));
        }
        assert_dir(&target)?;
        remove_dir(&target)?;
    }
    make_dirs(&dest)?;
    rename_or_copy(&path, &target)?;
    Ok(())
}

fn sibling(path: &Path, name: &str) -> Result<std::path::PathBuf> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(FsOpError::InvalidArgument(format!(
            "invalid entry name {name:?}"
        )));
    }
    Ok(match path.parent() {
        Some(parent) => parent.join(name),
        None => Path::new(name).to_path_buf(),
    })
}

/// Rename a file within its directory. The new name must be free.
pub fn rename_file(path: impl AsRef<Path>, name: &str) -> Result<()> {
    let path = normalize_path(path);
    assert_file(&path)?;
    let dest = sibling(&path, name)?;
    assert_not_exists(&dest)?;
    fs::rename(&path, &dest)?;
    Ok(())
}

/// Rename a directory within its parent. The new name must be free.
pub fn rename_dir(path: impl AsRef<Path>, name: &str) -> Result<()> {
    let path = normalize_path(path);
    assert_dir(&path)?;
    let dest = sibling(&path, name)?;
    assert_not_exists(&dest)?;
    fs::rename(&path, &dest)?;
    Ok(())
}

/// Change only the basename of a file, keeping its extension.
pub fn rename_file_basename(path: impl AsRef<Path>, basename: &str) -> Result<()> {
    let path = normalize_path(path);
    let extension = get_file_extension(&path);
    rename_file(&path, &join_filename(basename, &extension))
}

/// Change only the extension of a file, keeping its basename.
pub fn rename_file_extension(path: impl AsRef<Path>, extension: &str) -> Result<()> {
    let path = normalize_path(path);
    let basename = get_file_basename(&path);
    rename_file(&path, &join_filename(&basename, extension))
}
