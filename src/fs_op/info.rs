//! Sizes, content hashes and timestamps of files and directories.

use std::fmt::Write as _;
use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use std::time::SystemTime;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use md5::Md5;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use walkdir::WalkDir;

use crate::fs_op::convert::convert_size_bytes_to_string;
use crate::fs_op::error::{FsOpError, Result};
use crate::fs_op::path::normalize_path;
use crate::fs_op::search::{search_files, DEFAULT_FILES_PATTERN};
use crate::fs_op::stat::{assert_dir, assert_file};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HASH_CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl FromStr for HashAlgorithm {
    type Err = FsOpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(FsOpError::InvalidArgument(format!(
                "unsupported hash algorithm {s:?}"
            ))),
        }
    }
}

fn digest_reader<D: Digest>(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

impl HashAlgorithm {
    fn hex_digest(self, reader: impl Read) -> io::Result<String> {
        match self {
            HashAlgorithm::Md5 => digest_reader::<Md5>(reader),
            HashAlgorithm::Sha224 => digest_reader::<Sha224>(reader),
            HashAlgorithm::Sha256 => digest_reader::<Sha256>(reader),
            HashAlgorithm::Sha384 => digest_reader::<Sha384>(reader),
            HashAlgorithm::Sha512 => digest_reader::<Sha512>(reader),
        }
    }
}

/// Size of the file at `path` in bytes.
pub fn get_file_size(path: impl AsRef<Path>) -> Result<u64> {
    let path = normalize_path(path);
    assert_file(&path)?;
    Ok(fs::metadata(&path)?.len())
}

/// [`get_file_size`] as a human readable string, e.g. `1.50 MB`.
pub fn get_file_size_formatted(path: impl AsRef<Path>) -> Result<String> {
    Ok(convert_size_bytes_to_string(get_file_size(path)?))
}

/// Total size of the regular files below `path`. Symlinks are not followed
/// nor counted.
pub fn get_dir_size(path: impl AsRef<Path>) -> Result<u64> {
    let path = normalize_path(path);
    assert_dir(&path)?;
    let mut size = 0;
    for entry in WalkDir::new(&path).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            size += entry.metadata()?.len();
        }
    }
    Ok(size)
}

/// [`get_dir_size`] as a human readable string.
pub fn get_dir_size_formatted(path: impl AsRef<Path>) -> Result<String> {
    Ok(convert_size_bytes_to_string(get_dir_size(path)?))
}

/// Hex digest of the file content, read in 4 KiB chunks.
pub fn get_file_hash(path: impl AsRef<Path>, algorithm: HashAlgorithm) -> Result<String> {
    let path = normalize_path(path);
    assert_file(&path)?;
    Ok(algorithm.hex_digest(File::open(&path)?)?)
}

/// Digest over the hex digests of the files found by
/// [`search_files`] with its default pattern, taken in path order.
pub fn get_dir_hash(path: impl AsRef<Path>, algorithm: HashAlgorithm) -> Result<String> {
    let path = normalize_path(path);
    assert_dir(&path)?;
    let files = search_files(&path, DEFAULT_FILES_PATTERN)?;
    let digests = files
        .par_iter()
        .map(|f| get_file_hash(f, algorithm))
        .collect::<Result<Vec<_>>>()?;
    let mut joined = String::with_capacity(digests.iter().map(String::len).sum());
    for d in &digests {
        joined.push_str(d);
    }
    Ok(algorithm.hex_digest(joined.as_bytes())?)
}

fn creation_time(meta: &Metadata) -> io::Result<SystemTime> {
    // Not every filesystem records a birth time.
    meta.created().or_else(|_| meta.modified())
}

fn local(time: SystemTime) -> DateTime<Local> {
    time.into()
}

/// Render `date` with a strftime-style format, rejecting malformed formats
/// instead of panicking inside `Display`.
fn format_date(date: DateTime<Local>, fmt: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|i| matches!(i, Item::Error)) {
        return Err(FsOpError::InvalidArgument(format!(
            "invalid date format {fmt:?}"
        )));
    }
    let mut out = String::new();
    write!(out, "{}", date.format_with_items(items.into_iter()))
        .map_err(|_| FsOpError::InvalidArgument(format!("invalid date format {fmt:?}")))?;
    Ok(out)
}

/// Creation time of the file, or its modification time where the
/// platform does not record one.
pub fn get_file_creation_date(path: impl AsRef<Path>) -> Result<DateTime<Local>> {
    let path = normalize_path(path);
    assert_file(&path)?;
    Ok(local(creation_time(&fs::metadata(&path)?)?))
}

/// [`get_file_creation_date`] rendered with the strftime pattern `fmt`.
pub fn get_file_creation_date_formatted(path: impl AsRef<Path>, fmt: &str) -> Result<String> {
    format_date(get_file_creation_date(path)?, fmt)
}

/// Last modification time of the file.
pub fn get_file_last_modified_date(path: impl AsRef<Path>) -> Result<DateTime<Local>> {
    let path = normalize_path(path);
    assert_file(&path)?;
    Ok(local(fs::metadata(&path)?.modified()?))
}

/// [`get_file_last_modified_date`] rendered with `fmt`.
pub fn get_file_last_modified_date_formatted(path: impl AsRef<Path>, fmt: &str) -> Result<String> {
    format_date(get_file_last_modified_date(path)?, fmt)
}

/// Creation time of the directory, with the same fallback as for files.
pub fn get_dir_creation_date(path: impl AsRef<Path>) -> Result<DateTime<Local>> {
    let path = normalize_path(path);
    assert_dir(&path)?;
    Ok(local(creation_time(&fs::metadata(&path)?)?))
}

/// [`get_dir_creation_date`] rendered with `fmt`.
pub fn get_dir_creation_date_formatted(path: impl AsRef<Path>, fmt: &str) -> Result<String> {
    format_date(get_dir_creation_date(path)?, fmt)
}

/// Latest modification time of the directory or anything inside it.
pub fn get_dir_last_modified_date(path: impl AsRef<Path>) -> Result<DateTime<Local>> {
    let path = normalize_path(path);
    assert_dir(&path)?;
    let mut latest = fs::metadata(&path)?.modified()?;
    for entry in WalkDir::new(&path).min_depth(1) {
        latest = latest.max(entry?.metadata()?.modified()?);
    }
    Ok(local(latest))
}

/// [`get_dir_last_modified_date`] rendered with `fmt`.
pub fn get_dir_last_modified_date_formatted(path: impl AsRef<Path>, fmt: &str) -> Result<String> {
    format_date(get_dir_last_modified_date(path)?, fmt)
}
