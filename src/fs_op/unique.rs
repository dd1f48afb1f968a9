//! Collision-free names for staging files and directories.

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fs_op::error::Result;
use crate::fs_op::path::normalize_path;
use crate::fs_op::stat::{assert_dir, exists};

/// Decorations applied around the random part of a generated name:
/// `[prefix<sep>]<uuid>[<sep>suffix][.extension]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniqueNameOptions {
    pub prefix: String,
    pub suffix: String,
    pub extension: String,
    pub separator: String,
}

impl Default for UniqueNameOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            extension: String::new(),
            separator: "-".to_string(),
        }
    }
}

impl UniqueNameOptions {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    fn render(&self, id: &Uuid) -> String {
        let mut name = String::new();
        if !self.prefix.is_empty() {
            name.push_str(&self.prefix);
            name.push_str(&self.separator);
        }
        name.push_str(&id.hyphenated().to_string());
        if !self.suffix.is_empty() {
            name.push_str(&self.separator);
            name.push_str(&self.suffix);
        }
        let extension = self.extension.trim_start_matches('.').to_lowercase();
        if !extension.is_empty() {
            name.push('.');
            name.push_str(&extension);
        }
        name
    }
}

/// Return a name that does not exist inside `dir` at the time of the call.
///
/// `dir` must be an existing directory. A fresh v4 UUID is drawn until the
/// rendered name is free; in practice the first draw always is.
pub fn get_unique_name(dir: impl AsRef<Path>, opts: &UniqueNameOptions) -> Result<String> {
    let dir = normalize_path(dir);
    assert_dir(&dir)?;
    loop {
        let name = opts.render(&Uuid::new_v4());
        if !exists(dir.join(&name)) {
            return Ok(name);
        }
        tracing::debug!("unique name {} already taken in {}", name, dir.display());
    }
}
