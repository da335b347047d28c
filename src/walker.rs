use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file selected for scanning, numbered in walk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub extension: String,
    pub sequence: usize,
}

/// A non-fatal problem met while walking; the walk continues past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkWarning {
    pub path: Option<PathBuf>,
    pub reason: String,
}

#[derive(Debug)]
pub enum WalkEvent {
    Candidate(FileCandidate),
    Warning(WalkWarning),
}

/// Lazily walks `root` depth-first, entries sorted by file name within each
/// directory, following symbolic links. Link cycles, unreadable directories
/// and dangling links surface as [`WalkEvent::Warning`].
pub fn walk_dir<'a>(
    root: &Path,
    extensions: &'a BTreeSet<String>,
) -> impl Iterator<Item = WalkEvent> + 'a {
    let mut sequence = 0usize;
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    return None;
                }
                let extension = entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_ascii_lowercase())?;
                if !extensions.contains(&extension) {
                    return None;
                }
                debug!("Candidate: {}", entry.path().display());
                let candidate = FileCandidate {
                    path: entry.into_path(),
                    extension,
                    sequence,
                };
                sequence += 1;
                Some(WalkEvent::Candidate(candidate))
            }
            Err(err) => {
                let warning = describe_walk_error(&err);
                warn!(
                    "Skipping {}: {}",
                    warning
                        .path
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<unknown>".to_string()),
                    warning.reason
                );
                Some(WalkEvent::Warning(warning))
            }
        })
}

fn describe_walk_error(err: &walkdir::Error) -> WalkWarning {
    let path = err.path().map(Path::to_path_buf);
    let reason = if let Some(ancestor) = err.loop_ancestor() {
        format!("symbolic link cycle back to {}", ancestor.display())
    } else if let Some(io_err) = err.io_error() {
        match io_err.kind() {
            io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            io::ErrorKind::NotFound => "entry vanished or dangling link".to_string(),
            _ => io_err.to_string(),
        }
    } else {
        err.to_string()
    };
    WalkWarning { path, reason }
}
