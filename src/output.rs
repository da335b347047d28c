use crate::aggregate::{MatchGroup, ResultSet};
use crate::error::{Result, SupersearchError};
use crate::request::SearchRequest;
use crate::scanner::Match;
use clap::ValueEnum;
use colored::*;
use serde::Serialize;
use serde_json::json;
use std::fmt;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Renders a [`ResultSet`] for people (text) or programs (JSON).
pub struct OutputFormatter {
    format: OutputFormat,
    color: bool,
    max_matches_per_group: usize,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: true,
            max_matches_per_group: 5,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Matches listed per file in text output; `0` lists all of them.
    pub fn with_max_matches(mut self, max: usize) -> Self {
        self.max_matches_per_group = max;
        self
    }

    pub fn format_results(&self, results: &ResultSet, request: &SearchRequest) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(self.format_text(results)),
            OutputFormat::Json => self.format_json(results, request),
        }
    }

    fn format_json(&self, results: &ResultSet, request: &SearchRequest) -> Result<String> {
        let document = json!({
            "request": request,
            "cancelled": results.was_cancelled(),
            "stats": results.stats(),
            "groups": results.groups(),
            "warnings": results.warnings(),
        });
        serde_json::to_string_pretty(&document)
            .map_err(|e| SupersearchError::Other(format!("Failed to serialize results: {e}")))
    }

    fn format_text(&self, results: &ResultSet) -> String {
        let mut output = String::new();

        if results.is_empty() {
            output.push_str(&self.paint_red("No matching files found."));
            output.push('\n');
        } else {
            let stats = results.stats();
            output.push_str(&self.paint_green(&format!(
                "Found {} file(s) with {} match(es):",
                stats.files_matched, stats.total_matches
            )));
            output.push_str("\n\n");
            for group in results.groups() {
                self.format_group(&mut output, group);
            }
        }

        for warning in results.warnings() {
            let path = warning
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            output.push_str(&self.paint_dimmed(&format!("  warning: {path}: {}", warning.reason)));
            output.push('\n');
        }

        if results.was_cancelled() {
            output.push_str(&self.paint_yellow("Search was cancelled; results are partial."));
            output.push('\n');
        }

        output
    }

    fn format_group(&self, output: &mut String, group: &MatchGroup) {
        let header = format!("  [{:>3}] {}", group.index, group.path.display());
        output.push_str(&self.paint_header(&header));

        if let Some(reason) = &group.skipped {
            output.push_str(&self.paint_red(&format!("  skipped: {reason}")));
            output.push_str("\n\n");
            return;
        }

        let mut detail = format!("  ({}", group.match_count());
        detail.push_str(if group.match_count() == 1 {
            " match"
        } else {
            " matches"
        });
        if let Some(encoding) = &group.encoding {
            detail.push_str(&format!(", {}", encoding.name()));
            if encoding.fallback_used {
                detail.push_str(" fallback");
            }
        }
        if group.lossy {
            detail.push_str(", lossy");
        }
        if group.malformed_records > 0 {
            detail.push_str(&format!(", {} malformed row(s)", group.malformed_records));
        }
        detail.push(')');
        output.push_str(&self.paint_dimmed(&detail));
        output.push('\n');

        let shown = if self.max_matches_per_group == 0 {
            group.matches.len()
        } else {
            self.max_matches_per_group.min(group.matches.len())
        };
        for m in &group.matches[..shown] {
            output.push_str(&self.format_match(m));
            output.push('\n');
        }
        if group.matches.len() > shown {
            output.push_str(&self.paint_dimmed(&format!(
                "        … {} more match(es) not shown",
                group.matches.len() - shown
            )));
            output.push('\n');
        }
        output.push('\n');
    }

    fn format_match(&self, m: &Match) -> String {
        let mut position = format!("        line {:>5}, col {:>4}", m.line, m.column);
        if let Some(field) = m.field {
            position.push_str(&format!(", field {:>2}", field.field));
        }
        position.push_str("  │  ");

        let (before, matched, after) = m.context.parts();
        let lead = if m.context.truncated_before { "…" } else { "" };
        let tail = if m.context.truncated_after { "…" } else { "" };
        format!(
            "{}{}{}{}{}{}",
            self.paint_dimmed(&position),
            lead,
            before,
            self.paint_match(&matched),
            after,
            tail
        )
    }

    fn paint_header(&self, s: &str) -> String {
        if self.color {
            s.cyan().bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn paint_match(&self, s: &str) -> String {
        if self.color {
            s.yellow().bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn paint_green(&self, s: &str) -> String {
        if self.color {
            s.green().to_string()
        } else {
            s.to_string()
        }
    }

    fn paint_red(&self, s: &str) -> String {
        if self.color {
            s.red().to_string()
        } else {
            s.to_string()
        }
    }

    fn paint_yellow(&self, s: &str) -> String {
        if self.color {
            s.yellow().to_string()
        } else {
            s.to_string()
        }
    }

    fn paint_dimmed(&self, s: &str) -> String {
        if self.color {
            s.dimmed().to_string()
        } else {
            s.to_string()
        }
    }
}
