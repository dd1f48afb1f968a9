//! Atomic persistence primitives shared by the higher-level helpers.
//!
//! `atomic_write` stages content in a temporary file created in the *same
//! directory* as the target, forces it to disk, then renames it over the
//! target. Readers therefore observe either the previous complete content or
//! the new complete content. The staging file is owned by a
//! `tempfile::NamedTempFile`, whose `Drop` removes it on every exit path
//! that does not end in a successful rename.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::fs_op::metadata::{apply_mode, mode_of};

/// Name prefix of staging files created by [`atomic_write`].
pub const ATOMIC_TEMP_PREFIX: &str = ".tmp_atomic_write.";

/// Write `data` to `target` atomically, preserving the permission mask of
/// a pre-existing target.
pub fn atomic_write(target: &Path, data: &[u8]) -> io::Result<()> {
    atomic_write_with(target, data, |_| Ok(()))
}

/// [`atomic_write`] with a hook that runs after the staging file is durable
/// and before it is renamed into place. An error from the hook aborts the
/// write exactly as a crash at that point would, minus the leftover file.
pub(crate) fn atomic_write_with<F>(target: &Path, data: &[u8], before_rename: F) -> io::Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(ATOMIC_TEMP_PREFIX);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Subject to the process umask, like a regular `File::create`.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;

    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;

    let previous_mode = match fs::metadata(target) {
        Ok(_) => Some(mode_of(target)?),
        Err(_) => None,
    };

    before_rename(tmp.path())?;

    tracing::debug!(
        "atomic write: renaming {} -> {}",
        tmp.path().display(),
        target.display()
    );
    // On failure the `PersistError` hands the temp file back; dropping it
    // deletes the staging file.
    tmp.persist(target).map_err(|e| e.error)?;

    if let Some(mode) = previous_mode {
        apply_mode(target, mode)?;
    }

    sync_dir(dir);
    Ok(())
}

/// Flush the directory entry so the rename itself survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        tracing::debug!("could not sync directory {}: {}", dir.display(), e);
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

/// Rename `src` to `dst`; when the rename is refused (typically a
/// cross-filesystem move) fall back to copy + remove.
pub fn rename_or_copy(src: &Path, dst: &Path) -> io::Result<()> {
    let err = match fs::rename(src, dst) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    tracing::debug!(
        "rename {} -> {} failed ({}), falling back to copy",
        src.display(),
        dst.display(),
        err
    );

    if src.is_dir() {
        crate::fs_op::copy::copy_tree(src, dst)?;
        fs::remove_dir_all(src)?;
    } else if src.is_file() {
        crate::fs_op::copy::copy_file_raw(src, dst)?;
        fs::remove_file(src)?;
    } else {
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use tempfile::tempdir;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .expect("read dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with(ATOMIC_TEMP_PREFIX))
            .collect()
    }

    #[test]
    fn interrupted_write_keeps_previous_content() {
        let td = tempdir().unwrap();
        let target = td.path().join("c.txt");
        atomic_write(&target, b"A complete").unwrap();

        let res = atomic_write_with(&target, b"B partial?", |staged| {
            assert!(staged.exists(), "staging file should be on disk");
            Err(io::Error::other("simulated crash before rename"))
        });

        assert!(res.is_err());
        assert_eq!(fs::read(&target).unwrap(), b"A complete");
        assert!(leftovers(td.path()).is_empty());
    }

    #[test]
    fn interrupted_first_write_leaves_nothing() {
        let td = tempdir().unwrap();
        let target = td.path().join("new.txt");
        let res = atomic_write_with(&target, b"x", |_| Err(io::Error::other("boom")));
        assert!(res.is_err());
        assert!(!target.exists());
        assert!(leftovers(td.path()).is_empty());
    }

    #[test]
    fn failed_rename_cleans_up_staging_file() {
        let td = tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file rename.
        let target = td.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("inner"), b"x").unwrap();

        assert!(atomic_write(&target, b"data").is_err());
        assert!(target.is_dir());
        assert!(leftovers(td.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn preserves_existing_permissions() {
        let td = tempdir().unwrap();
        let target = td.path().join("script.sh");
        fs::write(&target, b"#!/bin/sh\n").unwrap();
        apply_mode(&target, 0o751).unwrap();

        atomic_write(&target, b"#!/bin/sh\necho hi\n").unwrap();
        assert_eq!(mode_of(&target).unwrap(), 0o751);
    }

    #[test]
    fn concurrent_atomic_writes_leave_no_temp_files() {
        let td = tempdir().unwrap();
        let names = 8usize;
        (0..256usize).into_par_iter().for_each(|i| {
            let target = td.path().join(format!("dst_{}.txt", i % names));
            let body = format!("payload {i}");
            atomic_write(&target, body.as_bytes()).expect("atomic write");
        });

        assert!(leftovers(td.path()).is_empty());
        for i in 0..names {
            let content = fs::read_to_string(td.path().join(format!("dst_{i}.txt"))).unwrap();
            assert!(content.starts_with("payload "), "torn content: {content:?}");
        }
    }

    #[test]
    fn rename_or_copy_moves_file_and_dir() {
        let td = tempdir().unwrap();
        let f = td.path().join("f.txt");
        fs::write(&f, b"file").unwrap();
        let moved = td.path().join("g.txt");
        rename_or_copy(&f, &moved).unwrap();
        assert!(!f.exists());
        assert_eq!(fs::read(&moved).unwrap(), b"file");

        let d = td.path().join("d");
        fs::create_dir_all(d.join("nested")).unwrap();
        fs::write(d.join("nested/x.txt"), b"x").unwrap();
        let moved_dir = td.path().join("e");
        rename_or_copy(&d, &moved_dir).unwrap();
        assert!(!d.exists());
        assert_eq!(fs::read(moved_dir.join("nested/x.txt")).unwrap(), b"x");
    }
}
