//! Zip and tar archives of files and directory trees.
//!
//! Listed files are stored under their file name. A listed directory
//! contributes its content, not itself: its files land at the archive root
//! and its subdirectories keep their path relative to it.

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::fs_op::create::{make_dirs, make_dirs_for_file};
use crate::fs_op::error::{FsOpError, Result};
use crate::fs_op::path::{get_filename, normalize_path};
use crate::fs_op::remove::remove_file;
use crate::fs_op::stat::{assert_exists, assert_file, assert_not_dir, assert_not_exists, assert_not_file};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TarCompression {
    #[default]
    None,
    Gzip,
    Bzip2,
    Xz,
}

impl TarCompression {
    fn detect(magic: &[u8]) -> Self {
        if magic.starts_with(GZIP_MAGIC) {
            TarCompression::Gzip
        } else if magic.starts_with(BZIP2_MAGIC) {
            TarCompression::Bzip2
        } else if magic.starts_with(XZ_MAGIC) {
            TarCompression::Xz
        } else {
            TarCompression::None
        }
    }
}

impl FromStr for TarCompression {
    type Err = FsOpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(TarCompression::None),
            "gz" | "gzip" => Ok(TarCompression::Gzip),
            "bz2" | "bzip2" => Ok(TarCompression::Bzip2),
            "xz" => Ok(TarCompression::Xz),
            other => Err(FsOpError::InvalidArgument(format!(
                "unsupported tar compression {other:?}"
            ))),
        }
    }
}

impl fmt::Display for TarCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TarCompression::None => "none",
            TarCompression::Gzip => "gz",
            TarCompression::Bzip2 => "bz2",
            TarCompression::Xz => "xz",
        })
    }
}

/// Compression method for zip entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZipCompression {
    Stored,
    #[default]
    Deflated,
}

impl From<ZipCompression> for CompressionMethod {
    fn from(c: ZipCompression) -> Self {
        match c {
            ZipCompression::Stored => CompressionMethod::Stored,
            ZipCompression::Deflated => CompressionMethod::Deflated,
        }
    }
}

impl FromStr for ZipCompression {
    type Err = FsOpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stored" | "store" | "none" => Ok(ZipCompression::Stored),
            "" | "deflated" | "deflate" => Ok(ZipCompression::Deflated),
            other => Err(FsOpError::InvalidArgument(format!(
                "unsupported zip compression {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ZipCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ZipCompression::Stored => "stored",
            ZipCompression::Deflated => "deflated",
        })
    }
}

/// A file to store and the name it gets inside the archive.
struct ArchiveEntry {
    source: PathBuf,
    name: String,
}

fn archive_name(basedir: &str, name: &str) -> String {
    if basedir.is_empty() {
        name.to_string()
    } else {
        format!("{basedir}/{name}")
    }
}

/// Recursively gather the files under `content_path`; `basedir` is the
/// archive-relative directory they are stored in.
fn collect_entries(content_path: &Path, basedir: &str, out: &mut Vec<ArchiveEntry>) -> Result<()> {
    assert_exists(content_path)?;
    if content_path.is_file() {
        out.push(ArchiveEntry {
            source: content_path.to_path_buf(),
            name: archive_name(basedir, &get_filename(content_path)),
        });
        return Ok(());
    }

    let mut children: Vec<PathBuf> = fs::read_dir(content_path)?
        .map(|e| e.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    children.sort();
    for child in children {
        let child_base = if child.is_dir() {
            archive_name(basedir, &get_filename(&child))
        } else {
            basedir.to_string()
        };
        collect_entries(&child, &child_base, out)?;
    }
    Ok(())
}

fn collect_all<P: AsRef<Path>>(content_paths: &[P]) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for p in content_paths {
        collect_entries(&normalize_path(p), "", &mut entries)?;
    }
    Ok(entries)
}

fn prepare_output(path: &Path, overwrite: bool) -> Result<()> {
    assert_not_dir(path)?;
    if !overwrite {
        assert_not_exists(path)?;
    }
    make_dirs_for_file(path)
}

/// Create a zip at `path` holding `content_paths`.
pub fn create_zip_file<P: AsRef<Path>>(
    path: impl AsRef<Path>,
    content_paths: &[P],
    overwrite: bool,
    compression: ZipCompression,
) -> Result<()> {
    let path = normalize_path(path);
    prepare_output(&path, overwrite)?;
    let entries = collect_all(content_paths)?;

    let mut writer = ZipWriter::new(File::create(&path)?);
    for entry in &entries {
        let mut options = SimpleFileOptions::default().compression_method(compression.into());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options = options.unix_permissions(fs::metadata(&entry.source)?.permissions().mode() & 0o777);
        }
        writer.start_file(entry.name.as_str(), options)?;
        io::copy(&mut File::open(&entry.source)?, &mut writer)?;
    }
    writer.finish()?.sync_all()?;
    tracing::debug!("wrote {} entries to {}", entries.len(), path.display());
    Ok(())
}

/// Relative archive paths that stay below the extraction root.
fn is_contained(name: &Path) -> bool {
    name.components().next().is_some()
        && name
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn escape_error(name: impl fmt::Display) -> FsOpError {
    FsOpError::Archive(format!("entry {name} escapes the extraction directory"))
}

/// Member names selected for extraction; `None` selects every member.
/// Names match exactly, ignoring a trailing `/`.
struct MemberFilter<'a> {
    wanted: Option<&'a [&'a str]>,
    seen: HashSet<&'a str>,
}

impl<'a> MemberFilter<'a> {
    fn new(wanted: Option<&'a [&'a str]>) -> Self {
        Self {
            wanted,
            seen: HashSet::new(),
        }
    }

    fn accepts(&mut self, name: &str) -> bool {
        let Some(wanted) = self.wanted else {
            return true;
        };
        let name = name.trim_end_matches('/');
        match wanted.iter().find(|w| w.trim_end_matches('/') == name) {
            Some(w) => {
                self.seen.insert(*w);
                true
            }
            None => false,
        }
    }

    fn finish(self) -> Result<()> {
        let missing = self
            .wanted
            .unwrap_or_default()
            .iter()
            .find(|w| !self.seen.contains(*w));
        match missing {
            Some(name) => Err(FsOpError::Archive(format!("no member named {name:?}"))),
            None => Ok(()),
        }
    }
}

fn prepare_extract(path: &Path, dest: &Path) -> Result<()> {
    assert_file(path)?;
    assert_not_file(dest)?;
    make_dirs(dest)
}

/// Extract the zip at `path` into `dest`, or only the `members` named.
/// Entries that would land outside `dest` abort the extraction, and so does
/// a requested member the archive does not hold.
pub fn extract_zip_file(
    path: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    members: Option<&[&str]>,
    autodelete: bool,
) -> Result<()> {
    let path = normalize_path(path);
    let dest = normalize_path(dest);
    prepare_extract(&path, &dest)?;

    let mut filter = MemberFilter::new(members);
    let mut archive = ZipArchive::new(File::open(&path)?)?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !filter.accepts(entry.name()) {
            continue;
        }
        let rel = match entry.enclosed_name() {
            Some(rel) if is_contained(&rel) => rel,
            _ => return Err(escape_error(entry.name())),
        };
        let target = dest.join(rel);
        if entry.is_dir() {
            make_dirs(&target)?;
            continue;
        }
        make_dirs_for_file(&target)?;
        io::copy(&mut entry, &mut File::create(&target)?)?;
        #[cfg(unix)]
        {
            if let Some(mode) = entry.unix_mode() {
                crate::fs_op::metadata::set_permissions(&target, mode & 0o777)?;
            }
        }
    }
    filter.finish()?;

    if autodelete {
        remove_file(&path)?;
    }
    Ok(())
}

fn write_tar<W: Write>(out: W, entries: &[ArchiveEntry]) -> io::Result<W> {
    let mut builder = tar::Builder::new(out);
    for entry in entries {
        builder.append_path_with_name(&entry.source, &entry.name)?;
    }
    builder.into_inner()
}

/// Create a tar at `path` holding `content_paths`, optionally compressed.
pub fn create_tar_file<P: AsRef<Path>>(
    path: impl AsRef<Path>,
    content_paths: &[P],
    overwrite: bool,
    compression: TarCompression,
) -> Result<()> {
    let path = normalize_path(path);
    prepare_output(&path, overwrite)?;
    let entries = collect_all(content_paths)?;

    let file = File::create(&path)?;
    let file = match compression {
        TarCompression::None => write_tar(file, &entries)?,
        TarCompression::Gzip => {
            write_tar(flate2::write::GzEncoder::new(file, flate2::Compression::default()), &entries)?
                .finish()?
        }
        TarCompression::Bzip2 => {
            write_tar(bzip2::write::BzEncoder::new(file, bzip2::Compression::default()), &entries)?
                .finish()?
        }
        TarCompression::Xz => write_tar(xz2::write::XzEncoder::new(file, 6), &entries)?.finish()?,
    };
    file.sync_all()?;
    tracing::debug!(
        "wrote {} entries to {} ({})",
        entries.len(),
        path.display(),
        compression
    );
    Ok(())
}

/// Extract the tar at `path` into `dest`, or only the `members` named,
/// detecting the compression from the leading magic bytes. Only regular
/// files and directories are extracted; links and special files are skipped.
pub fn extract_tar_file(
    path: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    members: Option<&[&str]>,
    autodelete: bool,
) -> Result<()> {
    let path = normalize_path(path);
    let dest = normalize_path(dest);
    prepare_extract(&path, &dest)?;

    let mut file = File::open(&path)?;
    let mut magic = Vec::with_capacity(XZ_MAGIC.len());
    (&mut file).take(XZ_MAGIC.len() as u64).read_to_end(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    let reader: Box<dyn Read> = match TarCompression::detect(&magic) {
        TarCompression::None => Box::new(file),
        TarCompression::Gzip => Box::new(flate2::read::GzDecoder::new(file)),
        TarCompression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(file)),
        TarCompression::Xz => Box::new(xz2::read::XzDecoder::new(file)),
    };

    let mut filter = MemberFilter::new(members);
    let mut archive = tar::Archive::new(reader);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let rel = entry.path()?.into_owned();
        if !filter.accepts(&rel.to_string_lossy()) {
            continue;
        }
        if !is_contained(&rel) {
            return Err(escape_error(rel.display()));
        }
        let kind = entry.header().entry_type();
        if !(kind.is_file() || kind.is_dir()) {
            tracing::warn!("skipping non-regular tar entry {}", rel.display());
            continue;
        }
        if !entry.unpack_in(&dest)? {
            return Err(escape_error(rel.display()));
        }
    }
    filter.finish()?;

    if autodelete {
        remove_file(&path)?;
    }
    Ok(())
}
