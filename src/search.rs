use crate::aggregate::{Aggregator, ResultSet};
use crate::error::{Result, SupersearchError};
use crate::matcher::KeywordMatcher;
use crate::progress::ProgressReporter;
use crate::request::SearchRequest;
use crate::scanner::{scan_file, ScanOptions, ScanOutcome};
use crate::walker::{walk_dir, FileCandidate, WalkEvent};
use crossbeam_channel::{bounded, unbounded};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Candidates queued per worker before the walker blocks.
const QUEUE_DEPTH: usize = 4;

/// Shared stop flag for a search run. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Walks, scans and aggregates one request.
///
/// The walker runs on the calling thread and feeds a bounded queue drained by
/// `jobs` worker threads. Completion order does not matter: the aggregator
/// restores walk order.
pub struct SearchEngine {
    options: ScanOptions,
    jobs: usize,
    cancel: CancellationToken,
    progress: Option<Arc<ProgressReporter>>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(ScanOptions::default())
    }
}

impl SearchEngine {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            jobs: num_cpus::get().max(1),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, progress: Arc<ProgressReporter>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Runs the search. Per-file problems end up in the result set; only a
    /// failure to start the worker pool is returned as an error.
    pub fn run(&self, request: &SearchRequest) -> Result<ResultSet> {
        let start = Instant::now();
        info!(
            "Searching {} for {:?} ({}, extensions: {:?}, {} worker(s))",
            request.root().display(),
            request.keyword(),
            if request.case_sensitive() {
                "case-sensitive"
            } else {
                "case-insensitive"
            },
            request.extensions(),
            self.jobs
        );

        let matcher = KeywordMatcher::new(request.keyword(), request.case_sensitive());
        let mut aggregator = Aggregator::new();

        thread::scope(|scope| -> Result<()> {
            let (task_tx, task_rx) = bounded::<FileCandidate>(self.jobs * QUEUE_DEPTH);
            let (result_tx, result_rx) = unbounded::<(usize, ScanOutcome)>();

            for worker in 0..self.jobs {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let matcher = &matcher;
                let options = &self.options;
                let cancel = &self.cancel;
                let progress = self.progress.as_deref();

                thread::Builder::new()
                    .name(format!("supersearch-worker-{worker}"))
                    .spawn_scoped(scope, move || {
                        for candidate in task_rx.iter() {
                            if cancel.is_cancelled() {
                                debug!("Cancelled, dropping {}", candidate.path.display());
                                continue;
                            }
                            if let Some(progress) = progress {
                                progress.set_current(&candidate.path);
                            }
                            let outcome = scan_file(&candidate, matcher, options);
                            if let Some(progress) = progress {
                                progress.record(&outcome);
                            }
                            if result_tx.send((candidate.sequence, outcome)).is_err() {
                                break;
                            }
                        }
                    })
                    .map_err(|e| {
                        SupersearchError::Other(format!("Failed to start worker thread: {e}"))
                    })?;
            }
            drop(task_rx);
            drop(result_tx);

            for event in walk_dir(request.root(), request.extensions()) {
                if self.cancel.is_cancelled() {
                    info!("Search cancelled, no further files dispatched");
                    break;
                }
                match event {
                    WalkEvent::Candidate(candidate) => {
                        if task_tx.send(candidate).is_err() {
                            break;
                        }
                    }
                    WalkEvent::Warning(warning) => aggregator.push_warning(warning),
                }
            }
            drop(task_tx);

            for (sequence, outcome) in result_rx.iter() {
                aggregator.push(sequence, outcome);
            }
            Ok(())
        })?;

        let results = aggregator.finish(self.cancel.is_cancelled());
        let stats = results.stats();
        info!(
            "Search finished in {:.2?}: {} file(s) scanned, {} with matches, {} skipped, {} match(es)",
            start.elapsed(),
            stats.files_scanned,
            stats.files_matched,
            stats.files_skipped,
            stats.total_matches
        );
        Ok(results)
    }
}
