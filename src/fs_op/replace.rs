//! Transactional replace of a file or directory.
//!
//! The new content is first staged next to the destination under a
//! collision-free name. Installing it is then a pair of back-to-back
//! renames: the old destination is evicted to a second unique name and the
//! staged copy is renamed onto the destination path. Finally the evicted
//! entry is deleted.
//!
//! Known limitation: there is no portable primitive that atomically swaps
//! two directory entries, so between the two renames the destination path
//! is briefly absent. The window is kept to two consecutive `rename(2)`
//! calls with no other I/O in between, and if the second rename fails the
//! evicted entry is moved back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::fs_op::copy::{copy_dir_content, copy_file};
use crate::fs_op::create::make_dirs;
use crate::fs_op::error::Result;
use crate::fs_op::path::{get_file_extension, normalize_path, split_filepath};
use crate::fs_op::remove::{remove_dir, remove_file};
use crate::fs_op::stat::{assert_dir, assert_file, assert_not_dir, assert_not_file, exists};
use crate::fs_op::unique::{get_unique_name, UniqueNameOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
}

fn remove_entry(path: &Path, kind: EntryKind) -> io::Result<()> {
    match kind {
        EntryKind::File => fs::remove_file(path),
        EntryKind::Dir => fs::remove_dir_all(path),
    }
}

/// Owns a staging path until it has been installed; removes it on drop
/// otherwise, so a failed copy or rename never leaves it behind.
struct Staged {
    path: PathBuf,
    kind: EntryKind,
    installed: bool,
}

impl Drop for Staged {
    fn drop(&mut self) {
        if self.installed || !exists(&self.path) {
            return;
        }
        if let Err(e) = remove_entry(&self.path, self.kind) {
            tracing::warn!(
                "could not remove staging entry {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Replace the file at `dest` with a copy of the file at `src`.
///
/// `dest` may be absent but must not be a directory; `src` must be an
/// existing file. Replacing a path with itself is a no-op. With
/// `autodelete` the source is removed once the new content is installed.
pub fn replace_file(dest: impl AsRef<Path>, src: impl AsRef<Path>, autodelete: bool) -> Result<()> {
    let dest = normalize_path(dest);
    let src = normalize_path(src);
    assert_not_dir(&dest)?;
    assert_file(&src)?;
    if dest == src {
        return Ok(());
    }

    let names = UniqueNameOptions::default().extension(get_file_extension(&dest));
    install(&dest, &names, EntryKind::File, |staged| {
        copy_file(&src, staged, false)
    })?;

    if autodelete {
        remove_file(&src)?;
    }
    Ok(())
}

/// Replace the directory at `dest` with a recursive copy of the directory
/// at `src`. Same contract as [`replace_file`], for directories.
pub fn replace_dir(dest: impl AsRef<Path>, src: impl AsRef<Path>, autodelete: bool) -> Result<()> {
    let dest = normalize_path(dest);
    let src = normalize_path(src);
    assert_not_file(&dest)?;
    assert_dir(&src)?;
    if dest == src {
        return Ok(());
    }

    install(&dest, &UniqueNameOptions::default(), EntryKind::Dir, |staged| {
        copy_dir_content(&src, staged)
    })?;

    if autodelete {
        remove_dir(&src)?;
    }
    Ok(())
}

fn install<F>(dest: &Path, names: &UniqueNameOptions, kind: EntryKind, stage: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    install_with(dest, names, kind, stage, |from, to| fs::rename(from, to))
}

/// [`install`] with the rename primitive injected, so a failure between
/// evicting the old entry and installing the new one can be reproduced.
fn install_with<F, R>(
    dest: &Path,
    names: &UniqueNameOptions,
    kind: EntryKind,
    stage: F,
    mut rename: R,
) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
    R: FnMut(&Path, &Path) -> io::Result<()>,
{
    let (dir, _) = split_filepath(dest);
    let dir = if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir
    };
    make_dirs(&dir)?;

    let mut staged = Staged {
        path: dir.join(get_unique_name(&dir, names)?),
        kind,
        installed: false,
    };
    tracing::debug!("staging {} for {}", staged.path.display(), dest.display());
    stage(&staged.path)?;

    if !exists(dest) {
        rename(&staged.path, dest)?;
        staged.installed = true;
        return Ok(());
    }

    let evicted = dir.join(get_unique_name(&dir, names)?);
    rename(dest, &evicted)?;
    if let Err(e) = rename(&staged.path, dest) {
        if let Err(restore) = rename(&evicted, dest) {
            tracing::warn!(
                "could not restore {} from {}: {}",
                dest.display(),
                evicted.display(),
                restore
            );
        }
        return Err(e.into());
    }
    staged.installed = true;
    tracing::debug!("installed {}, dropping {}", dest.display(), evicted.display());

    remove_entry(&evicted, kind)?;
    Ok(())
}
