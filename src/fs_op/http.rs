//! Fetching remote files over HTTP(S).
//!
//! The transport is the optional `http` cargo feature. Without it every
//! network operation fails with [`crate::fs_op::error::FsOpError::MissingOptionalDependency`].

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::fs_op::error::Result;
use crate::fs_op::path::get_filename;

pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Extra request settings, e.g. authentication headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadOptions {
    /// Target directory; the OS temp dir when unset.
    pub dirpath: Option<PathBuf>,
    /// Target file name; inferred from the response when unset.
    pub filename: Option<String>,
    pub chunk_size: usize,
    pub request: RequestOptions,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            dirpath: None,
            filename: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            request: RequestOptions::default(),
        }
    }
}

impl DownloadOptions {
    pub fn dirpath(mut self, dirpath: impl Into<PathBuf>) -> Self {
        self.dirpath = Some(dirpath.into());
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn request(mut self, request: RequestOptions) -> Self {
        self.request = request;
        self
    }
}

/// Whether this build can reach the network.
pub fn is_available() -> bool {
    cfg!(feature = "http")
}

fn content_disposition_filename(header: &str) -> Option<String> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let re = PATTERN
        .get_or_init(|| Regex::new(r#"filename="([^"]*)""#).ok())
        .as_ref()?;
    let name = get_filename(re.captures(header)?.get(1)?.as_str());
    (!name.is_empty()).then_some(name)
}

/// Name for a downloaded file: the `Content-Disposition` filename, else the
/// last segment of the URL path, else `download-<uuid>`.
#[cfg_attr(not(feature = "http"), allow(dead_code))]
pub(crate) fn infer_filename(content_disposition: Option<&str>, url: &str) -> String {
    content_disposition
        .and_then(content_disposition_filename)
        .or_else(|| Some(get_filename(url)).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| format!("download-{}", uuid::Uuid::new_v4()))
}

#[cfg(feature = "http")]
mod transport {
    use std::io::{Read, Write};
    use std::path::PathBuf;

    use reqwest::blocking::{Client, Response};
    use reqwest::header::CONTENT_DISPOSITION;

    use super::{infer_filename, DownloadOptions, RequestOptions};
    use crate::fs_op::create::make_dirs;
    use crate::fs_op::error::{FsOpError, Result};
    use crate::fs_op::helpers::ATOMIC_TEMP_PREFIX;
    use crate::fs_op::path::normalize_path;

    fn http_error(e: reqwest::Error) -> FsOpError {
        FsOpError::Http(e.to_string())
    }

    fn get(url: &str, opts: &RequestOptions) -> Result<Response> {
        let mut builder = Client::builder();
        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(http_error)?;
        let mut request = client.get(url);
        for (name, value) in &opts.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().map_err(http_error)?;
        if !response.status().is_success() {
            tracing::warn!("GET {} failed with status {}", url, response.status());
        }
        response.error_for_status().map_err(http_error)
    }

    pub fn download_file(url: &str, opts: &DownloadOptions) -> Result<PathBuf> {
        let mut response = get(url, &opts.request)?;

        let filename = match opts.filename.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => {
                let disposition = response
                    .headers()
                    .get(CONTENT_DISPOSITION)
                    .and_then(|v| v.to_str().ok());
                infer_filename(disposition, url)
            }
        };
        let dir = normalize_path(opts.dirpath.clone().unwrap_or_else(std::env::temp_dir));
        make_dirs(&dir)?;
        let target = dir.join(&filename);

        // Staged next to the target: an interrupted download never leaves a
        // truncated file under the final name.
        let mut tmp = tempfile::Builder::new()
            .prefix(ATOMIC_TEMP_PREFIX)
            .tempfile_in(&dir)?;
        let mut buf = vec![0u8; opts.chunk_size.max(1)];
        let mut total = 0u64;
        loop {
            let n = response.read(&mut buf)?;
            if n == 0 {
                break;
            }
            tmp.write_all(&buf[..n])?;
            total += n as u64;
        }
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| FsOpError::Io(e.error))?;
        tracing::debug!("downloaded {} bytes from {} to {}", total, url, target.display());
        Ok(target)
    }

    pub fn read_file_from_url(url: &str, opts: &RequestOptions) -> Result<String> {
        get(url, opts)?.text().map_err(http_error)
    }
}

/// Download `url` into a file and return its path.
pub fn download_file(url: &str, opts: &DownloadOptions) -> Result<PathBuf> {
    #[cfg(feature = "http")]
    {
        transport::download_file(url, opts)
    }
    #[cfg(not(feature = "http"))]
    {
        let _ = (url, opts);
        Err(crate::fs_op::error::FsOpError::MissingOptionalDependency("reqwest"))
    }
}

/// Fetch `url` and return the response body as text.
pub fn read_file_from_url(url: &str) -> Result<String> {
    read_file_from_url_with(url, &RequestOptions::default())
}

pub fn read_file_from_url_with(url: &str, opts: &RequestOptions) -> Result<String> {
    #[cfg(feature = "http")]
    {
        transport::read_file_from_url(url, opts)
    }
    #[cfg(not(feature = "http"))]
    {
        let _ = (url, opts);
        Err(crate::fs_op::error::FsOpError::MissingOptionalDependency("reqwest"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_from_content_disposition() {
        assert_eq!(
            infer_filename(
                Some(r#"attachment; filename="report.pdf""#),
                "https://example.com/get?id=1"
            ),
            "report.pdf"
        );
        assert_eq!(
            infer_filename(Some(r#"attachment; filename="../../etc/passwd""#), "x"),
            "passwd"
        );
    }

    #[test]
    fn filename_from_url_then_uuid() {
        assert_eq!(
            infer_filename(Some("inline"), "https://example.com/files/data.csv?x=1#top"),
            "data.csv"
        );
        let fallback = infer_filename(None, "https://example.com/");
        assert!(fallback.starts_with("download-"));
        assert_eq!(fallback.len(), "download-".len() + 36);
    }

    #[test]
    fn options_defaults() {
        let opts = DownloadOptions::default();
        assert_eq!(opts.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(opts.dirpath.is_none());
        let opts = opts.filename("f.bin").request(RequestOptions::default().header("X-Token", "t"));
        assert_eq!(opts.filename.as_deref(), Some("f.bin"));
        assert_eq!(opts.request.headers.len(), 1);
    }

    #[cfg(not(feature = "http"))]
    #[test]
    fn network_calls_need_the_http_feature() {
        use crate::fs_op::error::FsOpError;

        assert!(!is_available());
        assert!(matches!(
            read_file_from_url("https://example.com"),
            Err(FsOpError::MissingOptionalDependency("reqwest"))
        ));
        assert!(matches!(
            download_file("https://example.com", &DownloadOptions::default()),
            Err(FsOpError::MissingOptionalDependency("reqwest"))
        ));
    }
}
