use crate::delimited::{self, Malformation};
use crate::encoding::{self, DetectionStage, EncodingGuess, DEFAULT_SAMPLE_SIZE};
use crate::matcher::KeywordMatcher;
use crate::walker::FileCandidate;
use byte_unit::{Byte, UnitType};
use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONTEXT_WIDTH: usize = 60;

/// Codepoint window around a match. The matched span is given by position;
/// the text itself carries no markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSnippet {
    pub text: String,
    pub match_start: usize,
    pub match_len: usize,
    pub truncated_before: bool,
    pub truncated_after: bool,
}

impl ContextSnippet {
    /// Splits the snippet into (before, matched, after).
    pub fn parts(&self) -> (String, String, String) {
        let chars: Vec<char> = self.text.chars().collect();
        let start = self.match_start.min(chars.len());
        let end = (self.match_start + self.match_len).min(chars.len());
        (
            chars[..start].iter().collect(),
            chars[start..end].iter().collect(),
            chars[end..].iter().collect(),
        )
    }
}

/// Where a match sits inside a delimited record; both indices 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldPosition {
    pub record: usize,
    pub field: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub path: PathBuf,
    /// 1-based line.
    pub line: usize,
    /// 1-based column in codepoints.
    pub column: usize,
    pub matched_text: String,
    pub context: ContextSnippet,
    pub field: Option<FieldPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    FreeText,
    Delimited(char),
}

impl ScanMode {
    pub fn for_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => ScanMode::Delimited(','),
            "tsv" => ScanMode::Delimited('\t'),
            _ => ScanMode::FreeText,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub sample_size: usize,
    pub context_width: usize,
    pub max_file_size: Option<u64>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            context_width: DEFAULT_CONTEXT_WIDTH,
            max_file_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub encoding: EncodingGuess,
    pub matches: Vec<Match>,
    pub malformed_records: usize,
    /// Full decode replaced at least one byte sequence with U+FFFD.
    pub lossy: bool,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Scanned(FileReport),
    Skipped { path: PathBuf, reason: String },
}

impl ScanOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ScanOutcome::Scanned(report) => &report.path,
            ScanOutcome::Skipped { path, .. } => path,
        }
    }
}

/// Reads, decodes and scans one file. Never fails: read problems come back as
/// [`ScanOutcome::Skipped`].
pub fn scan_file(
    candidate: &FileCandidate,
    matcher: &KeywordMatcher,
    options: &ScanOptions,
) -> ScanOutcome {
    let path = &candidate.path;

    if let Some(limit) = options.max_file_size {
        match fs::metadata(path) {
            Ok(metadata) if metadata.len() > limit => {
                return skipped(
                    path,
                    format!(
                        "file too large ({} > {})",
                        human_size(metadata.len()),
                        human_size(limit)
                    ),
                );
            }
            Ok(_) => {}
            Err(e) => return skipped(path, describe_io_error(&e)),
        }
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return skipped(path, describe_io_error(&e)),
    };

    let sample_len = bytes.len().min(options.sample_size);
    let partial = sample_len < bytes.len();
    let mut guess = encoding::detect(&bytes[..sample_len], !partial);
    if guess.stage != DetectionStage::Bom && bytes[..sample_len].contains(&0) {
        return skipped(path, "binary content".to_string());
    }

    let (mut text, mut lossy) = guess.decode(&bytes);
    if lossy && partial {
        // The sample looked clean but the rest of the file does not.
        let full = encoding::detect(&bytes, true);
        if full.encoding != guess.encoding {
            debug!(
                "{}: {} from the first {} bytes does not fit the whole file, using {}",
                path.display(),
                guess.name(),
                sample_len,
                full.name()
            );
            guess = full;
            (text, lossy) = guess.decode(&bytes);
        }
    }

    if guess.fallback_used {
        warn!(
            "No encoding decoded {} cleanly, falling back to {}",
            path.display(),
            guess.name()
        );
    }
    if lossy {
        warn!(
            "Lossy decode of {} as {}: undecodable bytes replaced",
            path.display(),
            guess.name()
        );
    }

    let mode = ScanMode::for_extension(&candidate.extension);
    let (matches, malformed_records) =
        scan_text(path, &text, matcher, mode, options.context_width);
    debug!(
        "Scanned {} ({}, {} bytes): {} match(es)",
        path.display(),
        guess.name(),
        bytes.len(),
        matches.len()
    );

    ScanOutcome::Scanned(FileReport {
        path: path.clone(),
        encoding: guess,
        matches,
        malformed_records,
        lossy,
        bytes: bytes.len() as u64,
    })
}

/// Scans decoded text and returns the matches ordered by (line, column)
/// together with the number of malformed delimited records.
pub fn scan_text(
    path: &Path,
    text: &str,
    matcher: &KeywordMatcher,
    mode: ScanMode,
    context_width: usize,
) -> (Vec<Match>, usize) {
    let lines: Vec<&str> = LogicalLines::new(text).collect();
    let line_chars: Vec<Vec<char>> = lines.iter().map(|l| l.chars().collect()).collect();
    let mut matches = Vec::new();
    let mut malformed = 0;

    match mode {
        ScanMode::FreeText => {
            for (idx, chars) in line_chars.iter().enumerate() {
                scan_line(path, idx, chars, matcher, context_width, &mut matches);
            }
        }
        ScanMode::Delimited(delimiter) => {
            for record in delimited::parse_records(&lines, delimiter) {
                if let Some(reason) = record.malformed {
                    malformed += 1;
                    debug!(
                        "{}: record {} at line {} is malformed ({}), scanning as text",
                        path.display(),
                        record.index,
                        record.first_line + 1,
                        describe_malformation(reason)
                    );
                    for idx in record.lines() {
                        scan_line(path, idx, &line_chars[idx], matcher, context_width, &mut matches);
                    }
                    continue;
                }

                for (field_idx, field) in record.fields.iter().enumerate() {
                    for hit in matcher.find_all(&field.content) {
                        let last = hit + matcher.len() - 1;
                        let (line_idx, col) = field.positions[hit];
                        let (last_line, _) = field.positions[last];
                        let last_col = field.ends[last];
                        let line = &line_chars[line_idx];
                        let span = if last_line == line_idx {
                            last_col + 1 - col
                        } else {
                            line.len() - col
                        };
                        matches.push(Match {
                            path: path.to_path_buf(),
                            line: line_idx + 1,
                            column: col + 1,
                            matched_text: field.content[hit..hit + matcher.len()].iter().collect(),
                            context: snippet(line, col, span, context_width),
                            field: Some(FieldPosition {
                                record: record.index,
                                field: field_idx,
                            }),
                        });
                    }
                }
            }
            matches.sort_by_key(|m| (m.line, m.column));
        }
    }

    (matches, malformed)
}

fn scan_line(
    path: &Path,
    idx: usize,
    chars: &[char],
    matcher: &KeywordMatcher,
    context_width: usize,
    out: &mut Vec<Match>,
) {
    for hit in matcher.find_all(chars) {
        out.push(Match {
            path: path.to_path_buf(),
            line: idx + 1,
            column: hit + 1,
            matched_text: chars[hit..hit + matcher.len()].iter().collect(),
            context: snippet(chars, hit, matcher.len(), context_width),
            field: None,
        });
    }
}

/// Window of at most `width` codepoints centred on `line[start..start + len]`.
pub fn snippet(line: &[char], start: usize, len: usize, width: usize) -> ContextSnippet {
    let start = start.min(line.len());
    let len = len.min(line.len() - start);
    let pad = width.saturating_sub(len) / 2;
    let from = start.saturating_sub(pad);
    let to = (start + len + pad).min(line.len());
    ContextSnippet {
        text: line[from..to].iter().collect(),
        match_start: start - from,
        match_len: len,
        truncated_before: from > 0,
        truncated_after: to < line.len(),
    }
}

/// Splits text into lines on `\r\n`, `\n` or `\r`. A trailing terminator
/// does not start another line.
pub struct LogicalLines<'a> {
    rest: &'a str,
}

impl<'a> LogicalLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for LogicalLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.find(|c: char| c == '\n' || c == '\r') {
            Some(pos) => {
                let line = &self.rest[..pos];
                let skip = if self.rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = &self.rest[pos + skip..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}

fn skipped(path: &Path, reason: String) -> ScanOutcome {
    warn!("Skipping {}: {}", path.display(), reason);
    ScanOutcome::Skipped {
        path: path.to_path_buf(),
        reason,
    }
}

fn describe_io_error(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "file vanished before it could be read".to_string(),
        io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => format!("read error: {err}"),
    }
}

fn describe_malformation(malformation: Malformation) -> String {
    match malformation {
        Malformation::UnterminatedQuote => "unterminated quote".to_string(),
        Malformation::TextAfterQuote => "text after closing quote".to_string(),
        Malformation::FieldCount { expected, found } => {
            format!("expected {expected} fields, found {found}")
        }
    }
}

fn human_size(bytes: u64) -> String {
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{:.2} {}", adjusted.get_value(), adjusted.get_unit())
}
