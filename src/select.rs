//! Turns what the user typed after the listing into files to open.
use crate::aggregate::ResultSet;
use crate::error::{Result, SupersearchError};
use crate::opener::FileOpener;
use log::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Nothing,
    All,
    Indices(Vec<usize>),
}

impl Selection {
    /// Accepts an empty line, `a`/`A` for everything, or comma-separated
    /// 1-based indices. Entries that are not numbers are returned as errors
    /// next to the valid ones.
    pub fn parse(input: &str) -> (Selection, Vec<SupersearchError>) {
        let input = input.trim();
        if input.is_empty() {
            return (Selection::Nothing, Vec::new());
        }
        if input.eq_ignore_ascii_case("a") {
            return (Selection::All, Vec::new());
        }

        let mut indices = Vec::new();
        let mut errors = Vec::new();
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.parse::<usize>() {
                Ok(index) => indices.push(index),
                Err(_) => errors.push(SupersearchError::InvalidSelection(part.to_string())),
            }
        }

        let selection = if indices.is_empty() {
            Selection::Nothing
        } else {
            Selection::Indices(indices)
        };
        (selection, errors)
    }
}

/// Resolves the selection against `results` and opens each entry. Returns
/// how many files were opened and the per-entry errors.
pub fn open_selection(
    results: &ResultSet,
    selection: &Selection,
    opener: &dyn FileOpener,
) -> (usize, Vec<SupersearchError>) {
    let indices: Vec<usize> = match selection {
        Selection::Nothing => return (0, Vec::new()),
        Selection::All => results
            .groups()
            .iter()
            .filter(|g| !g.is_skipped())
            .map(|g| g.index)
            .collect(),
        Selection::Indices(indices) => indices.clone(),
    };

    let mut opened = 0;
    let mut errors = Vec::new();
    for index in indices {
        let outcome: Result<()> = results
            .resolve(index)
            .and_then(|location| opener.open(&location));
        match outcome {
            Ok(()) => opened += 1,
            Err(e) => {
                warn!("Could not open entry {index}: {e}");
                errors.push(e);
            }
        }
    }
    (opened, errors)
}
