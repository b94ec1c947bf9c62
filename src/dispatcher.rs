//! Batch dispatcher
//!
//! Builds the [`WorkRegistry`] from the candidate list, starts a fixed
//! pool of OS threads (one [`Worker`] each), joins them all and aggregates
//! their statistics into a [`BatchReport`].
//!
//! ```text
//! Initializing -> Running -> Joining -> Reporting -> Terminal
//!       |                                               ^
//!       +------------------ (no files) -----------------+
//! ```
//!
//! Worker statistics are only read after the owning thread has been
//! joined. Failing to spawn a thread aborts the run; a worker that panics
//! fails it once every other worker has been joined and reported.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::config::BatchConfig;
use crate::encoder::EncoderBackend;
use crate::error::BatchError;
use crate::pipeline::Converter;
use crate::registry::WorkRegistry;
use crate::worker::{SkippedFile, Worker, WorkerStats};

/// Lifecycle of a dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Initializing,
    Running,
    Joining,
    Reporting,
    Terminal,
}

/// Aggregated result of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Candidate files handed to the dispatcher
    pub files_found: usize,
    /// Files converted across all workers
    pub converted: usize,
    /// Per-worker statistics, ordered by worker id
    pub workers: Vec<WorkerStats>,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Every file that was not converted, across all workers
    pub fn skipped(&self) -> impl Iterator<Item = &SkippedFile> {
        self.workers.iter().flat_map(|w| w.skipped.iter())
    }

    pub fn skipped_count(&self) -> usize {
        self.workers.iter().map(|w| w.skipped.len()).sum()
    }

    /// Total files claimed by the workers
    pub fn claimed(&self) -> usize {
        self.workers.iter().map(|w| w.claimed).sum()
    }
}

/// Runs one batch over a fixed worker pool
pub struct Dispatcher {
    config: BatchConfig,
    converter: Converter,
    state: DispatcherState,
}

impl Dispatcher {
    pub fn new(config: BatchConfig, backend: Arc<dyn EncoderBackend>) -> Self {
        Self {
            config,
            converter: Converter::new(backend),
            state: DispatcherState::Initializing,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Convert every file in `files`
    pub fn run(&mut self, files: Vec<PathBuf>) -> Result<BatchReport, BatchError> {
        self.transition(DispatcherState::Initializing);
        self.config.validate()?;

        let start = Instant::now();
        let registry = Arc::new(WorkRegistry::new(files));
        if registry.is_empty() {
            self.transition(DispatcherState::Terminal);
            return Ok(BatchReport {
                elapsed: start.elapsed(),
                ..BatchReport::default()
            });
        }

        self.transition(DispatcherState::Running);
        let handles = self.spawn_workers(&registry)?;

        self.transition(DispatcherState::Joining);
        let mut workers = Vec::with_capacity(handles.len());
        let mut failure = None;
        // Join every worker, even after a failure, so none outlives the run
        for (id, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(stats) => workers.push(stats),
                Err(_) => {
                    error!("Worker {} panicked", id);
                    failure.get_or_insert(BatchError::JoinFailed { worker: id });
                }
            }
        }
        let elapsed = start.elapsed();

        if let Some(err) = failure {
            self.transition(DispatcherState::Reporting);
            for stats in &workers {
                error!(
                    "Thread {} processed {} files before the run failed.",
                    stats.worker_id, stats.converted
                );
            }
            self.transition(DispatcherState::Terminal);
            return Err(err);
        }

        self.transition(DispatcherState::Reporting);
        let report = BatchReport {
            files_found: registry.len(),
            converted: workers.iter().map(|w| w.converted).sum(),
            workers,
            elapsed,
        };

        self.transition(DispatcherState::Terminal);
        Ok(report)
    }

    fn spawn_workers(
        &self,
        registry: &Arc<WorkRegistry>,
    ) -> Result<Vec<JoinHandle<WorkerStats>>, BatchError> {
        let mut handles = Vec::with_capacity(self.config.workers);
        for id in 0..self.config.workers {
            let worker = Worker::new(id, Arc::clone(registry), self.converter.clone());
            let handle = thread::Builder::new()
                .name(format!("wav2mp3-worker-{}", id))
                .spawn(move || worker.run())
                .map_err(|source| {
                    error!("Unable to spawn worker {}: {}", id, source);
                    BatchError::SpawnFailed { worker: id, source }
                })?;
            handles.push(handle);
        }
        Ok(handles)
    }

    fn transition(&mut self, next: DispatcherState) {
        debug!("dispatcher: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
