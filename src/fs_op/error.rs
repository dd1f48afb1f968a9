use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the filesystem helpers in `fs_op`.
#[derive(Error, Debug)]
pub enum FsOpError {
    /// The path exists but has the wrong kind (file vs directory), or it
    /// exists when it was required not to.
    #[error("Invalid path `{path}`: {msg}")]
    InvalidPathKind { path: PathBuf, msg: String },

    /// The path was required to exist but does not.
    #[error("Path not found: `{0}`")]
    NotFound(PathBuf),

    /// An operation needs a component that was not compiled in.
    #[error("Missing optional dependency `{0}`; enable the corresponding cargo feature")]
    MissingOptionalDependency(&'static str),

    /// Wrapper for underlying IO errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure reading or writing a zip/tar archive.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Transport failure or non-success HTTP status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Unknown text codec or content that cannot be represented in it.
    #[error("Encoding `{encoding}` failed: {msg}")]
    Encoding { encoding: String, msg: String },

    /// Caller supplied an argument that cannot be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl FsOpError {
    pub(crate) fn invalid_kind(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        FsOpError::InvalidPathKind {
            path: path.into(),
            msg: msg.into(),
        }
    }
}

impl From<zip::result::ZipError> for FsOpError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => FsOpError::Io(io),
            other => FsOpError::Archive(other.to_string()),
        }
    }
}

impl From<walkdir::Error> for FsOpError {
    fn from(e: walkdir::Error) -> Self {
        FsOpError::Io(e.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FsOpError>;
