use crate::encoding::DEFAULT_SAMPLE_SIZE;
use crate::request::DEFAULT_EXTENSIONS;
use crate::scanner::{ScanOptions, DEFAULT_CONTEXT_WIDTH};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub display: DisplayConfig,
    pub open: OpenConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub extensions: Vec<String>,
    pub case_sensitive: bool,
    pub jobs: Option<usize>,
    pub max_file_size_mb: Option<u64>,
    pub sample_size_kb: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            case_sensitive: false,
            jobs: None,
            max_file_size_mb: None,
            sample_size_kb: DEFAULT_SAMPLE_SIZE / 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub context_width: usize,
    pub max_matches_per_file: usize,
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            context_width: DEFAULT_CONTEXT_WIDTH,
            max_matches_per_file: 5,
            color: true,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OpenConfig {
    /// Command template, e.g. `code -g {path}:{line}:{column}`. Falls back to
    /// the system default program when unset.
    pub editor: Option<String>,
}

impl Config {
    /// Loads the first config file found, or the defaults when there is none.
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_path = config_dir.join("supersearch/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".supersearch.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".supersearch.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            sample_size: self.search.sample_size_kb.max(1).saturating_mul(1024),
            context_width: self.display.context_width,
            max_file_size: self.search.max_file_size_mb.map(megabytes),
        }
    }
}

/// `mb` MiB in bytes, saturating at `u64::MAX`.
pub fn megabytes(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}
