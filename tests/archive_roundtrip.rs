mod common;

use tempfile::tempdir;

use fsutil::{
    create_tar_file, create_zip_file, extract_tar_file, extract_zip_file, get_dir_hash,
    get_dir_size, search_files, write_file, HashAlgorithm, TarCompression, WriteOptions,
    ZipCompression, DEFAULT_FILES_PATTERN,
};

#[test]
fn archived_tree_extracts_to_identical_content() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let tmp = tempdir()?;
    let src = tmp.path().join("project");
    for (name, body) in [
        ("README.md", "# project"),
        ("src/main.rs", "fn main() {}"),
        ("src/util/mod.rs", "pub fn util() {}"),
    ] {
        write_file(src.join(name), body, &WriteOptions::default())?;
    }
    let expected = get_dir_hash(&src, HashAlgorithm::Md5)?;

    let zip = tmp.path().join("dist/project.zip");
    create_zip_file(&zip, &[&src], false, ZipCompression::Deflated)?;
    let unzipped = tmp.path().join("unzipped");
    extract_zip_file(&zip, &unzipped, None, false)?;
    assert_eq!(get_dir_hash(&unzipped, HashAlgorithm::Md5)?, expected);

    let tgz = tmp.path().join("dist/project.tar.gz");
    create_tar_file(&tgz, &[&src], false, TarCompression::Gzip)?;
    let untarred = tmp.path().join("untarred");
    extract_tar_file(&tgz, &untarred, None, true)?;
    assert_eq!(get_dir_hash(&untarred, HashAlgorithm::Md5)?, expected);
    assert!(!tgz.exists());

    assert_eq!(get_dir_size(&untarred)?, get_dir_size(&src)?);
    assert_eq!(
        search_files(&untarred, DEFAULT_FILES_PATTERN)?.len(),
        search_files(&src, DEFAULT_FILES_PATTERN)?.len()
    );
    Ok(())
}
