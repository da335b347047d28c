use crate::scanner::ScanOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ProgressStats {
    pub files_processed: usize,
    pub files_matched: usize,
    pub files_skipped: usize,
    pub bytes_processed: u64,
    pub matches_found: usize,
    start_time: Instant,
}

impl ProgressStats {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Spinner on stderr that follows a search run. The total is unknown up
/// front because the walk is lazy.
pub struct ProgressReporter {
    pub main_progress: ProgressBar,
    stats: Mutex<ProgressStats>,
    current: Mutex<String>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} files | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        let main_progress = ProgressBar::new_spinner().with_style(style);
        main_progress.enable_steady_tick(Duration::from_millis(100));
        Self::with_bar(main_progress)
    }

    /// Reporter that draws nothing; statistics are still collected.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(main_progress: ProgressBar) -> Self {
        Self {
            main_progress,
            stats: Mutex::new(ProgressStats {
                files_processed: 0,
                files_matched: 0,
                files_skipped: 0,
                bytes_processed: 0,
                matches_found: 0,
                start_time: Instant::now(),
            }),
            current: Mutex::new(String::new()),
        }
    }

    pub fn set_current(&self, path: &Path) {
        if let Some(name) = path.file_name() {
            *self.current.lock() = name.to_string_lossy().into_owned();
        }
        let stats = self.stats();
        self.refresh(&stats);
    }

    pub fn record(&self, outcome: &ScanOutcome) {
        let stats = {
            let mut stats = self.stats.lock();
            stats.files_processed += 1;
            match outcome {
                ScanOutcome::Scanned(report) => {
                    stats.bytes_processed += report.bytes;
                    stats.matches_found += report.matches.len();
                    if !report.matches.is_empty() {
                        stats.files_matched += 1;
                    }
                }
                ScanOutcome::Skipped { .. } => stats.files_skipped += 1,
            }
            stats.clone()
        };
        self.main_progress.inc(1);
        self.refresh(&stats);
    }

    fn refresh(&self, stats: &ProgressStats) {
        let message = format!(
            "{} matched, {} skipped | {}",
            stats.files_matched,
            stats.files_skipped,
            self.current.lock()
        );
        self.main_progress.set_message(message);
    }

    pub fn stats(&self) -> ProgressStats {
        self.stats.lock().clone()
    }

    pub fn finish(&self) -> ProgressStats {
        let stats = self.stats();
        self.main_progress.finish_and_clear();
        stats
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_record_counts_skips() {
        let reporter = ProgressReporter::hidden();
        reporter.record(&ScanOutcome::Skipped {
            path: PathBuf::from("x.txt"),
            reason: "permission denied".to_string(),
        });
        reporter.set_current(Path::new("dir/y.txt"));
        assert_eq!(reporter.main_progress.message(), "0 matched, 1 skipped | y.txt");
        let stats = reporter.finish();
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_matched, 0);
        assert_eq!(stats.matches_found, 0);
    }
}
