//! Keyword locator for text and delimited files.
//!
//! A search walks a directory tree, guesses each file's encoding, and reports
//! every occurrence of a keyword by line and codepoint column:
//!
//! ```no_run
//! use supersearch::{SearchEngine, SearchRequest};
//!
//! let request = SearchRequest::new("/data/notes", "keyword")?;
//! let results = SearchEngine::default().run(&request)?;
//! for group in results.groups() {
//!     println!("[{}] {} ({} matches)", group.index, group.path.display(), group.match_count());
//! }
//! # Ok::<(), supersearch::SupersearchError>(())
//! ```
pub mod aggregate;
pub mod cli;
pub mod config;
pub mod delimited;
pub mod encoding;
pub mod error;
pub mod matcher;
pub mod opener;
pub mod output;
pub mod progress;
pub mod request;
pub mod scanner;
pub mod search;
pub mod select;
pub mod walker;

pub use aggregate::{Aggregator, Location, MatchGroup, ResultSet, SearchStats};
pub use clap::Parser;
pub use cli::Cli;
pub use config::Config;
pub use encoding::{detect, DetectionStage, EncodingGuess};
pub use error::{Result, SupersearchError};
pub use matcher::KeywordMatcher;
pub use opener::{FileOpener, SystemOpener};
pub use output::{OutputFormat, OutputFormatter};
pub use progress::ProgressReporter;
pub use request::SearchRequest;
pub use scanner::{scan_file, ContextSnippet, FieldPosition, Match, ScanMode, ScanOptions, ScanOutcome};
pub use search::{CancellationToken, SearchEngine};
pub use select::{open_selection, Selection};
pub use walker::{walk_dir, FileCandidate, WalkEvent, WalkWarning};

/// Runs `request` with default scan options on all available cores.
pub fn search(request: &SearchRequest) -> Result<ResultSet> {
    SearchEngine::default().run(request)
}
