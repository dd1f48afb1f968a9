//! Reading and writing file content.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::fs_op::create::make_dirs_for_file;
use crate::fs_op::error::{FsOpError, Result};
use crate::fs_op::helpers::atomic_write;
use crate::fs_op::path::normalize_path;
use crate::fs_op::stat::{assert_file, assert_not_dir};

/// Text codec used to turn `str` content into bytes and back.
///
/// Names resolve through the WHATWG label table of `encoding_rs`
/// (`cp1252`, `shift_jis`, `koi8-r`, ...). `ascii` and `latin-1` keep their
/// strict byte-exact meaning instead of the WHATWG windows-1252 mapping.
/// UTF-16 labels decode but cannot encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
    Other(&'static encoding_rs::Encoding),
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin-1",
            Encoding::Other(enc) => enc.name(),
        }
    }

    fn error(self, msg: String) -> FsOpError {
        FsOpError::Encoding {
            encoding: self.name().to_string(),
            msg,
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        let limit = match self {
            Encoding::Utf8 => return Ok(text.as_bytes().to_vec()),
            Encoding::Ascii => 0x7f,
            Encoding::Latin1 => 0xff,
            Encoding::Other(enc) => {
                if enc.output_encoding() != enc {
                    return Err(self.error("encoding to this codec is not supported".to_string()));
                }
                let (bytes, _, had_errors) = enc.encode(text);
                if had_errors {
                    return Err(self.error("text contains unmappable characters".to_string()));
                }
                return Ok(bytes.into_owned());
            }
        };
        text.chars()
            .map(|c| match u8::try_from(u32::from(c)) {
                Ok(b) if u32::from(b) <= limit => Ok(b),
                _ => Err(self.error(format!("cannot encode character {c:?}"))),
            })
            .collect()
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| self.error(e.to_string())),
            Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(i) => Err(self.error(format!("non-ascii byte at offset {i}"))),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Encoding::Other(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(self.error("malformed byte sequence".to_string()));
                }
                Ok(text.into_owned())
            }
        }
    }
}

impl FromStr for Encoding {
    type Err = FsOpError;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim().to_ascii_lowercase();
        match label.replace('_', "-").as_str() {
            "utf-8" | "utf8" => return Ok(Encoding::Utf8),
            "ascii" | "us-ascii" => return Ok(Encoding::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" | "l1" => return Ok(Encoding::Latin1),
            _ => {}
        }
        let enc = encoding_rs::Encoding::for_label(label.as_bytes())
            .or_else(|| encoding_rs::Encoding::for_label(label.replace('_', "-").as_bytes()))
            .ok_or_else(|| FsOpError::Encoding {
                encoding: s.to_string(),
                msg: "unsupported encoding".to_string(),
            })?;
        Ok(if enc == encoding_rs::UTF_8 {
            Encoding::Utf8
        } else {
            Encoding::Other(enc)
        })
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Encoding {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Encoding {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(d)?.parse().map_err(serde::de::Error::custom)
    }
}

/// How [`write_file`] writes: truncate or append, which codec, and whether
/// to go through an atomic temp-file-and-rename sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    pub append: bool,
    pub encoding: Encoding,
    pub atomic: bool,
}

impl WriteOptions {
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }
}

/// Line selection for [`read_file_lines`]. Negative indexes count from the
/// end of the file (`-1` is the last line); both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadLinesOptions {
    pub line_start: i64,
    pub line_end: i64,
    pub strip_white: bool,
    pub skip_empty: bool,
    pub encoding: Encoding,
}

impl Default for ReadLinesOptions {
    fn default() -> Self {
        Self {
            line_start: 0,
            line_end: -1,
            strip_white: true,
            skip_empty: true,
            encoding: Encoding::Utf8,
        }
    }
}

impl ReadLinesOptions {
    pub fn range(mut self, line_start: i64, line_end: i64) -> Self {
        self.line_start = line_start;
        self.line_end = line_end;
        self
    }

    pub fn strip_white(mut self, strip_white: bool) -> Self {
        self.strip_white = strip_white;
        self
    }

    pub fn skip_empty(mut self, skip_empty: bool) -> Self {
        self.skip_empty = skip_empty;
        self
    }

    fn is_full_range(&self) -> bool {
        self.line_start == 0 && self.line_end == -1
    }
}

/// Read the whole file at `path` as text.
pub fn read_file(path: impl AsRef<Path>, encoding: Encoding) -> Result<String> {
    let path = normalize_path(path);
    assert_file(&path)?;
    encoding.decode(&fs::read(&path)?)
}

/// Split on `\n`, `\r\n` and a lone `\r`, dropping the terminators.
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = content;
    while let Some(i) = rest.find(['\r', '\n']) {
        lines.push(&rest[..i]);
        let skip = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[i + skip..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }
    lines
}

/// Read the lines of a file, optionally restricted to a line range.
///
/// For the full range, lines come back without terminators. For a partial
/// range they keep their terminator unless `strip_white` removes it.
pub fn read_file_lines(path: impl AsRef<Path>, opts: &ReadLinesOptions) -> Result<Vec<String>> {
    let path = normalize_path(path);
    let content = read_file(&path, opts.encoding)?;

    let mut lines: Vec<String> = if opts.is_full_range() {
        split_lines(&content).into_iter().map(str::to_string).collect()
    } else {
        let count = content.split_inclusive('\n').count() as i64;
        let start = if opts.line_start < 0 {
            (opts.line_start + count).max(0)
        } else {
            opts.line_start
        };
        let end = if opts.line_end < 0 {
            (opts.line_end + count).min(count - 1)
        } else {
            opts.line_end
        };
        content
            .split_inclusive('\n')
            .enumerate()
            .filter(|(i, _)| (start..=end).contains(&(*i as i64)))
            .map(|(_, l)| l.to_string())
            .collect()
    };

    if opts.strip_white {
        lines = lines.into_iter().map(|l| l.trim().to_string()).collect();
    }
    if opts.skip_empty {
        lines.retain(|l| !l.is_empty());
    }
    Ok(lines)
}

/// Count the lines of a file; a final line without terminator counts too.
pub fn read_file_lines_count(path: impl AsRef<Path>) -> Result<usize> {
    let path = normalize_path(path);
    assert_file(&path)?;
    let bytes = fs::read(&path)?;
    Ok(bytes.split_inclusive(|b| *b == b'\n').count())
}

/// Write `content` to the file at `path`.
///
/// Parent directories are created as needed; `path` must not be a
/// directory. With `opts.atomic` the file is replaced through a durable
/// temporary file and a rename, so readers only ever see the old or the new
/// complete content, and an existing file keeps its permission mask. An
/// atomic append requires the file to exist.
pub fn write_file(path: impl AsRef<Path>, content: &str, opts: &WriteOptions) -> Result<()> {
    let path = normalize_path(path);
    assert_not_dir(&path)?;
    make_dirs_for_file(&path)?;
    let bytes = opts.encoding.encode(content)?;

    if opts.atomic {
        let data = if opts.append {
            assert_file(&path)?;
            let mut existing = fs::read(&path)?;
            existing.extend_from_slice(&bytes);
            existing
        } else {
            bytes
        };
        atomic_write(&path, &data)?;
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(opts.append)
        .truncate(!opts.append)
        .open(&path)?;
    file.write_all(&bytes)?;
    Ok(())
}

/// Read and decode a JSON file.
pub fn read_file_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = read_file(path, Encoding::Utf8)?;
    Ok(serde_json::from_str(&content)?)
}

/// Encode `data` as JSON and write it to `path` (never appending).
///
/// Types without a native JSON form plug in through serde; see
/// [`crate::fs_op::json`] for timestamp, set and `Display` adapters.
pub fn write_file_json<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    data: &T,
    opts: &WriteOptions,
) -> Result<()> {
    let content = serde_json::to_string(data)?;
    write_file(path, &content, &opts.append(false))
}
