mod common;

use std::fs;

use tempfile::tempdir;

use fsutil::{copy_dir_content, move_dir, move_file, FsOpError};

// When the source is a symlink to a directory, the target's content is what
// gets copied.
#[cfg(unix)]
#[test]
fn symlink_to_dir_copy_copies_target_contents() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let tmp = tempdir()?;
    let target = tmp.path().join("target");
    fs::create_dir_all(&target)?;
    fs::write(target.join("inner.txt"), b"hello")?;

    let link = tmp.path().join("link_to_target");
    std::os::unix::fs::symlink(&target, &link)?;

    let dest_tmp = tempdir()?;
    let dest = dest_tmp.path().join("out");
    copy_dir_content(&link, &dest)?;

    let copied = dest.join("inner.txt");
    assert!(copied.exists(), "expected copied file exists at {:?}", copied);
    assert_eq!(fs::read_to_string(copied)?, "hello");
    Ok(())
}

// A move into a read-only directory fails and leaves the source in place.
#[cfg(unix)]
#[test]
fn move_dir_into_unwritable_dest_leaves_source_intact() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    common::init_tracing();
    let tmp = tempdir()?;
    let src = tmp.path().join("sourcedir");
    fs::create_dir_all(&src)?;
    fs::write(src.join("file.txt"), b"data")?;

    let dest_parent = tempdir()?;
    fs::set_permissions(dest_parent.path(), fs::Permissions::from_mode(0o555))?;

    // Privileged users ignore the mode bits; nothing to check then.
    let write_check = dest_parent.path().join("write-check");
    if fs::write(&write_check, b"").is_ok() {
        fs::remove_file(&write_check)?;
        fs::set_permissions(dest_parent.path(), fs::Permissions::from_mode(0o755))?;
        return Ok(());
    }

    let res = move_dir(&src, dest_parent.path(), false);
    fs::set_permissions(dest_parent.path(), fs::Permissions::from_mode(0o755))?;

    assert!(res.is_err(), "expected move_dir to fail when dest is unwritable");
    assert!(src.join("file.txt").exists(), "source should survive a failed move");
    Ok(())
}

#[test]
fn move_file_onto_directory_name_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let tmp = tempdir()?;
    let f = tmp.path().join("report.txt");
    fs::write(&f, b"x")?;
    let dest = tmp.path().join("dest");
    fs::create_dir_all(dest.join("report.txt"))?;

    let res = move_file(&f, &dest, true);
    assert!(matches!(res, Err(FsOpError::InvalidPathKind { .. })));
    assert!(f.exists());
    Ok(())
}

#[test]
fn move_file_into_missing_dest_creates_it() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let tmp = tempdir()?;
    let f = tmp.path().join("a.txt");
    fs::write(&f, b"payload")?;
    let dest = tmp.path().join("x/y/z");

    move_file(&f, &dest, false)?;
    assert!(!f.exists());
    assert_eq!(fs::read(dest.join("a.txt"))?, b"payload");
    Ok(())
}
