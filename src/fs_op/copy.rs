use std::io;
use std::path::Path;

use fs_extra::dir::{copy as dir_copy, CopyOptions as DirCopyOptions};
use fs_extra::file::{copy as file_copy, CopyOptions as FileCopyOptions};

use crate::fs_op::create::{make_dirs, make_dirs_for_file};
use crate::fs_op::error::Result;
use crate::fs_op::metadata::preserve_metadata;
use crate::fs_op::path::{get_filename, normalize_path};
use crate::fs_op::stat::{assert_dir, assert_file, assert_not_dir, assert_not_exists, assert_not_file};

// fs_extra buffer size for file and tree copies.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Copy one regular file, overwriting `dst`, then carry over permissions,
/// timestamps and (best-effort) extended attributes.
pub(crate) fn copy_file_raw(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut options = FileCopyOptions::new();
    options.overwrite = true;
    options.buffer_size = COPY_BUFFER_SIZE;
    let n = file_copy(src, dst, &options).map_err(io::Error::other)?;
    preserve_metadata(src, dst)?;
    Ok(n)
}

/// Recursively copy the *contents* of directory `src` into `dst`, creating
/// `dst` if needed and overwriting files that already exist there.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dst)?;

    let mut options = DirCopyOptions::new();
    // Copy what is inside `src`, not the `src` folder itself.
    options.content_only = true;
    options.overwrite = true;
    options.buffer_size = COPY_BUFFER_SIZE;

    dir_copy(src, dst, &options).map_err(io::Error::other)?;
    preserve_metadata(src, dst)
}

/// Copy the file at `path` to `dest`, preserving its metadata. Unless
/// `overwrite`, an existing `dest` is an error.
pub fn copy_file(path: impl AsRef<Path>, dest: impl AsRef<Path>, overwrite: bool) -> Result<()> {
    let path = normalize_path(path);
    let dest = normalize_path(dest);
    assert_file(&path)?;
    assert_not_dir(&dest)?;
    if !overwrite {
        assert_not_exists(&dest)?;
    }
    make_dirs_for_file(&dest)?;
    copy_file_raw(&path, &dest)?;
    Ok(())
}

/// Copy the directory at `path` (itself, not only its content) into the
/// directory `dest`, i.e. to `dest/<dirname>`.
pub fn copy_dir(path: impl AsRef<Path>, dest: impl AsRef<Path>, overwrite: bool) -> Result<()> {
    let path = normalize_path(path);
    let dest = normalize_path(dest);
    assert_dir(&path)?;
    let dest = dest.join(get_filename(&path));
    assert_not_file(&dest)?;
    if !overwrite {
        assert_not_exists(&dest)?;
    }
    copy_dir_content(&path, &dest)
}

/// Copy everything inside directory `path` into `dest`, merging with and
/// overwriting whatever `dest` already holds.
pub fn copy_dir_content(path: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let path = normalize_path(path);
    let dest = normalize_path(dest);
    assert_dir(&path)?;
    assert_not_file(&dest)?;
    make_dirs(&dest)?;
    copy_tree(&path, &dest)?;
    Ok(())
}
