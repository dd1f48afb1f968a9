//! Permission masks and metadata preservation.
//!
//! Permission masks are POSIX `rwx` bits for owner/group/other (`0o777`
//! range). On platforms without such semantics reading a mask synthesizes
//! one from the read-only flag and writing a mask does nothing.
//!
//! `preserve_metadata` is what `copy_file` uses to behave like `cp -p`:
//! permissions and timestamps are core and propagate errors, extended
//! attributes are best-effort.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::{set_file_times, FileTime};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::fs_op::error::Result;
use crate::fs_op::path::normalize_path;
use crate::fs_op::stat::assert_exists;

/// Return the permission mask of `path` (e.g. `0o644`).
pub fn get_permissions(path: impl AsRef<Path>) -> Result<u32> {
    let path = normalize_path(path);
    assert_exists(&path)?;
    Ok(mode_of(&path)?)
}

/// Apply permission mask `mode` (masked to `0o777`) to `path`.
pub fn set_permissions(path: impl AsRef<Path>, mode: u32) -> Result<()> {
    let path = normalize_path(path);
    assert_exists(&path)?;
    Ok(apply_mode(&path, mode)?)
}

#[cfg(unix)]
pub(crate) fn mode_of(path: &Path) -> io::Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::metadata(path)?.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
pub(crate) fn mode_of(path: &Path) -> io::Result<u32> {
    let readonly = fs::metadata(path)?.permissions().readonly();
    Ok(if readonly { 0o444 } else { 0o666 })
}

#[cfg(unix)]
pub(crate) fn apply_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))
}

#[cfg(not(unix))]
pub(crate) fn apply_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Best-effort copy of extended attributes; failures are only logged.
#[cfg(unix)]
fn copy_xattrs(src: &Path, dst: &Path) {
    if let Ok(names) = xattr::list(src) {
        for name in names {
            if let Ok(Some(val)) = xattr::get(src, &name) {
                if let Err(e) = xattr::set(dst, &name, &val) {
                    tracing::debug!("xattr {:?} not copied to {}: {}", name, dst.display(), e);
                }
            }
        }
    }
}

#[cfg(not(unix))]
fn copy_xattrs(_src: &Path, _dst: &Path) {}

/// Copy permission bits from `src` to `dst`.
pub(crate) fn copy_permissions(src: &Path, dst: &Path) -> io::Result<()> {
    let perms = fs::metadata(src)?.permissions();
    fs::set_permissions(dst, perms)
}

fn copy_times(src: &Path, dst: &Path) -> io::Result<()> {
    let meta = fs::metadata(src)?;
    let m = FileTime::from_last_modification_time(&meta);
    let a = FileTime::from_last_access_time(&meta);
    set_file_times(dst, a, m)
}

/// Preserve metadata from `src` to `dst`.
///
/// For a file, permissions and timestamps are applied and errors propagate.
/// For a directory the tree is walked and metadata is applied to every
/// corresponding path under `dst`; missing targets and individual failures
/// are skipped so bulk copies stay resilient.
pub(crate) fn preserve_metadata(src: &Path, dst: &Path) -> io::Result<()> {
    if !src.exists() || !dst.exists() {
        return Ok(());
    }

    if src.is_file() {
        copy_permissions(src, dst)?;
        copy_times(src, dst)?;
        copy_xattrs(src, dst);
        return Ok(());
    }

    let entries: Vec<PathBuf> = WalkDir::new(src)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .collect();

    entries
        .into_par_iter()
        .for_each(|p| apply_metadata_to_target(&p, src, dst));

    Ok(())
}

fn apply_metadata_to_target(path: &Path, src_root: &Path, dst_root: &Path) {
    let Ok(rel) = path.strip_prefix(src_root) else {
        return;
    };
    let target = dst_root.join(rel);
    if !target.exists() {
        return;
    }
    let _ = copy_permissions(path, &target);
    let _ = copy_times(path, &target);
    copy_xattrs(path, &target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    #[test]
    fn copy_permissions_and_timestamps_file() -> io::Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");

        writeln!(fs::File::create(&src)?, "hello")?;
        writeln!(fs::File::create(&dst)?, "world")?;

        #[cfg(unix)]
        apply_mode(&src, 0o640)?;

        let past = SystemTime::now() - Duration::from_secs(24 * 3600);
        let ft = FileTime::from_system_time(past);
        set_file_times(&src, ft, ft)?;

        preserve_metadata(&src, &dst)?;

        #[cfg(unix)]
        assert_eq!(mode_of(&dst)?, 0o640);

        let dst_m = fs::metadata(&dst)?.modified()?;
        let src_m = fs::metadata(&src)?.modified()?;
        let diff = dst_m
            .duration_since(src_m)
            .unwrap_or_else(|e| e.duration());
        assert!(diff.as_secs() < 2, "timestamps differ too much");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn get_and_set_permissions_roundtrip() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("f.txt");
        fs::write(&f, b"x").unwrap();
        set_permissions(&f, 0o777).unwrap();
        assert_eq!(get_permissions(&f).unwrap(), 0o777);
        set_permissions(&f, 0o600).unwrap();
        assert_eq!(get_permissions(&f).unwrap(), 0o600);
    }

    #[test]
    fn permissions_of_missing_path_is_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            get_permissions(&missing),
            Err(crate::fs_op::error::FsOpError::NotFound(_))
        ));
    }
}
