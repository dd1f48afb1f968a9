mod common;

use assert_fs::prelude::*;
use assert_fs::TempDir;

use fsutil::{
    clean_dir, copy_dir, get_dir_size, get_unique_name, is_empty_dir, list_dirs, list_files,
    remove_dir_content, search_dirs, transform_filepath, Change, UniqueNameOptions,
    DEFAULT_DIRS_PATTERN,
};

#[test]
fn copy_then_clean_tree() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let temp = TempDir::new()?;
    temp.child("src/a.txt").write_str("aaaa")?;
    temp.child("src/empty.txt").touch()?;
    temp.child("src/deep/nested/b.txt").write_str("bb")?;
    temp.child("src/hollow/inner").create_dir_all()?;

    copy_dir(temp.child("src").path(), temp.child("dst").path(), false)?;
    let copied = temp.child("dst/src");
    assert_eq!(get_dir_size(copied.path())?, 6);
    assert_eq!(list_dirs(copied.path())?.len(), 2);

    clean_dir(copied.path(), true, true)?;
    assert!(!copied.child("empty.txt").path().exists());
    assert!(!copied.child("hollow").path().exists());
    assert!(copied.child("deep/nested/b.txt").path().exists());
    assert_eq!(
        search_dirs(copied.path(), DEFAULT_DIRS_PATTERN)?.len(),
        2,
        "only deep and deep/nested remain"
    );

    remove_dir_content(copied.path())?;
    assert!(is_empty_dir(copied.path())?);
    assert!(list_files(temp.child("src").path())?.len() == 2);

    temp.close()?;
    Ok(())
}

#[test]
fn unique_names_and_path_transform() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let temp = TempDir::new()?;
    let opts = UniqueNameOptions::default()
        .prefix("backup")
        .extension(".TAR.GZ");
    let name = get_unique_name(temp.path(), &opts)?;
    assert!(name.starts_with("backup-"));
    assert!(name.ends_with(".tar.gz"));

    let moved = transform_filepath(
        temp.child("docs/report.txt").path(),
        Change::Set("archive"),
        Change::Map(&|b: &str| b.to_uppercase()),
        Change::Set("md"),
    )?;
    assert!(moved.ends_with("archive/REPORT.md"));

    temp.close()?;
    Ok(())
}
