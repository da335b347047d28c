//! Collects per-file scan outcomes into a deterministic, numbered result set.
use crate::encoding::EncodingGuess;
use crate::error::{Result, SupersearchError};
use crate::scanner::{Match, ScanOutcome};
use crate::walker::WalkWarning;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

/// All matches of one file, selectable by `index`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchGroup {
    /// 1-based, stable for the lifetime of the [`ResultSet`].
    pub index: usize,
    pub path: PathBuf,
    pub encoding: Option<EncodingGuess>,
    pub matches: Vec<Match>,
    pub malformed_records: usize,
    pub lossy: bool,
    /// Set when the file could not be scanned; such groups have no matches.
    pub skipped: Option<String>,
}

impl MatchGroup {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub files_scanned: usize,
    pub files_matched: usize,
    pub files_skipped: usize,
    pub total_matches: usize,
    pub bytes_scanned: u64,
}

/// Target handed to a file opener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    groups: Vec<MatchGroup>,
    warnings: Vec<WalkWarning>,
    stats: SearchStats,
    cancelled: bool,
}

impl ResultSet {
    pub fn groups(&self) -> &[MatchGroup] {
        &self.groups
    }

    pub fn warnings(&self) -> &[WalkWarning] {
        &self.warnings
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// The run stopped early; groups cover only the files scanned before that.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn total_matches(&self) -> usize {
        self.stats.total_matches
    }

    pub fn get(&self, index: usize) -> Option<&MatchGroup> {
        index
            .checked_sub(1)
            .and_then(|i| self.groups.get(i))
    }

    /// Resolves a user-facing group index to the position of its first match.
    pub fn resolve(&self, index: usize) -> Result<Location> {
        let group = self
            .get(index)
            .ok_or(SupersearchError::SelectionOutOfRange {
                index,
                max: self.groups.len(),
            })?;

        if let Some(reason) = &group.skipped {
            return Err(SupersearchError::SelectionSkipped {
                index,
                reason: reason.clone(),
            });
        }

        let (line, column) = group
            .matches
            .first()
            .map(|m| (m.line, m.column))
            .unwrap_or((1, 1));
        Ok(Location {
            path: group.path.clone(),
            line,
            column,
        })
    }
}

/// Accepts outcomes in completion order and re-imposes walk order on finish.
#[derive(Debug, Default)]
pub struct Aggregator {
    outcomes: Vec<(usize, ScanOutcome)>,
    warnings: Vec<WalkWarning>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `sequence` is the walker's emission number for the file.
    pub fn push(&mut self, sequence: usize, outcome: ScanOutcome) {
        self.outcomes.push((sequence, outcome));
    }

    pub fn push_warning(&mut self, warning: WalkWarning) {
        self.warnings.push(warning);
    }

    pub fn finish(self, cancelled: bool) -> ResultSet {
        let Aggregator {
            mut outcomes,
            warnings,
        } = self;
        outcomes.par_sort_by_key(|(sequence, _)| *sequence);

        let mut stats = SearchStats::default();
        let mut groups = Vec::new();

        for (_, outcome) in outcomes {
            match outcome {
                ScanOutcome::Scanned(report) => {
                    stats.files_scanned += 1;
                    stats.bytes_scanned += report.bytes;
                    if report.matches.is_empty() {
                        continue;
                    }
                    stats.files_matched += 1;
                    stats.total_matches += report.matches.len();

                    let mut matches = report.matches;
                    matches.sort_by_key(|m| (m.line, m.column));
                    groups.push(MatchGroup {
                        index: groups.len() + 1,
                        path: report.path,
                        encoding: Some(report.encoding),
                        matches,
                        malformed_records: report.malformed_records,
                        lossy: report.lossy,
                        skipped: None,
                    });
                }
                ScanOutcome::Skipped { path, reason } => {
                    stats.files_skipped += 1;
                    groups.push(MatchGroup {
                        index: groups.len() + 1,
                        path,
                        encoding: None,
                        matches: Vec::new(),
                        malformed_records: 0,
                        lossy: false,
                        skipped: Some(reason),
                    });
                }
            }
        }

        ResultSet {
            groups,
            warnings,
            stats,
            cancelled,
        }
    }
}
