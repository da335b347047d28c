use crate::error::{Result, SupersearchError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: [&str; 2] = ["txt", "csv"];

/// An immutable description of one search run.
///
/// Built once at the input boundary; construction is where the fatal
/// conditions (missing root, non-directory root, empty keyword) are raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    root: PathBuf,
    keyword: String,
    case_sensitive: bool,
    extensions: BTreeSet<String>,
}

impl SearchRequest {
    pub fn new(root: impl AsRef<Path>, keyword: impl Into<String>) -> Result<Self> {
        let keyword = keyword.into();
        if keyword.is_empty() {
            return Err(SupersearchError::EmptyKeyword);
        }

        let root = root.as_ref();
        let metadata = match fs::metadata(root) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SupersearchError::RootNotFound(root.to_path_buf()));
            }
            Err(e) => return Err(SupersearchError::Io(e)),
        };
        if !metadata.is_dir() {
            return Err(SupersearchError::NotADirectory(root.to_path_buf()));
        }
        let root = fs::canonicalize(root)?;

        Ok(Self {
            root,
            keyword,
            case_sensitive: false,
            extensions: default_extensions(),
        })
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Replaces the extension set. Entries may carry a leading dot and any
    /// case; an empty result keeps the defaults.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: BTreeSet<String> = extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        self.extensions = if normalized.is_empty() {
            default_extensions()
        } else {
            normalized
        };
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_ascii_lowercase()))
    }
}

fn default_extensions() -> BTreeSet<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}
