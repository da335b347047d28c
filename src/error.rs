use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupersearchError {
    #[error("Directory does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Keyword must not be empty")]
    EmptyKeyword,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index {index} is out of range (1-{max})")]
    SelectionOutOfRange { index: usize, max: usize },

    #[error("Entry {index} was skipped: {reason}")]
    SelectionSkipped { index: usize, reason: String },

    #[error("Invalid selection: {0:?}")]
    InvalidSelection(String),

    #[error("Failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl SupersearchError {
    /// Errors that stop a run before any traversal starts.
    pub fn is_fatal_request_error(&self) -> bool {
        matches!(
            self,
            SupersearchError::RootNotFound(_)
                | SupersearchError::NotADirectory(_)
                | SupersearchError::EmptyKeyword
        )
    }
}

pub type Result<T> = std::result::Result<T, SupersearchError>;
