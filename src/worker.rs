//! Conversion workers
//!
//! A worker repeatedly claims the next unclaimed file from the shared
//! [`WorkRegistry`] and converts it, until the registry is exhausted.
//!
//! ```text
//! Idle -> Claiming -> Converting -> Idle
//!            |
//!            +-> Done   (registry exhausted)
//! ```
//!
//! Converting always returns to Idle, whatever the outcome.

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, trace, warn};

use crate::pipeline::{ConversionOutcome, Converter};
use crate::registry::{FileIndex, WorkRegistry};

/// Lifecycle of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Claiming,
    Converting(FileIndex),
    Done,
}

/// A file a worker could not convert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
    /// Output-side failure rather than a bad input
    pub fatal: bool,
}

/// Per-worker counters, read by the dispatcher after join
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub worker_id: usize,
    /// Files converted successfully
    pub converted: usize,
    /// Files claimed, whatever their outcome
    pub claimed: usize,
    pub skipped: Vec<SkippedFile>,
}

/// One unit of the worker pool
///
/// Owns everything it needs; the dispatcher moves it into its thread.
pub struct Worker {
    id: usize,
    registry: Arc<WorkRegistry>,
    converter: Converter,
    state: WorkerState,
    stats: WorkerStats,
}

impl Worker {
    pub fn new(id: usize, registry: Arc<WorkRegistry>, converter: Converter) -> Self {
        Self {
            id,
            registry,
            converter,
            state: WorkerState::Idle,
            stats: WorkerStats {
                worker_id: id,
                ..WorkerStats::default()
            },
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Run until the registry is exhausted and hand back the statistics
    pub fn run(mut self) -> WorkerStats {
        while self.step() != WorkerState::Done {}
        trace!("[:{}] done after {} file(s)", self.id, self.stats.claimed);
        self.stats
    }

    /// Advance the state machine by one transition
    pub fn step(&mut self) -> WorkerState {
        self.state = match self.state {
            WorkerState::Idle => WorkerState::Claiming,
            WorkerState::Claiming => match self.registry.claim_next() {
                Some(index) => WorkerState::Converting(index),
                None => WorkerState::Done,
            },
            WorkerState::Converting(index) => {
                self.convert(index);
                WorkerState::Idle
            }
            WorkerState::Done => WorkerState::Done,
        };
        self.state
    }

    fn convert(&mut self, index: FileIndex) {
        let Some(path) = self.registry.path(index).map(PathBuf::from) else {
            return;
        };
        self.stats.claimed += 1;

        let outcome = self.converter.convert(&path);
        match &outcome {
            ConversionOutcome::Success { .. } => {
                info!("[:{}][ok] .... {}", self.id, path.display());
                self.stats.converted += 1;
            }
            ConversionOutcome::Skipped(reason) | ConversionOutcome::Fatal(reason) => {
                warn!("Error in file {}: {}. Skipping.", path.display(), reason);
                self.stats.skipped.push(SkippedFile {
                    path,
                    reason: reason.to_string(),
                    fatal: matches!(outcome, ConversionOutcome::Fatal(_)),
                });
            }
        }
    }
}
