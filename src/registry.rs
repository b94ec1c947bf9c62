//! Shared registry of pending input files
//!
//! The registry pairs an immutable, index-aligned list of input paths with
//! a claimed flag per entry. Workers take files with [`WorkRegistry::claim_next`];
//! the scan for the first unclaimed flag and the store that claims it run
//! under one lock, so every index is handed out exactly once. Flags never
//! go back to unclaimed.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Position of a file in the registry
pub type FileIndex = usize;

/// Candidate files plus their claimed flags
#[derive(Debug)]
pub struct WorkRegistry {
    files: Vec<PathBuf>,
    claimed: Mutex<Vec<bool>>,
}

impl WorkRegistry {
    pub fn new(files: Vec<PathBuf>) -> Self {
        let claimed = Mutex::new(vec![false; files.len()]);
        Self { files, claimed }
    }

    /// Claim the lowest unclaimed index
    ///
    /// Returns `None` once every index has been claimed, and on every call
    /// after that. The scan is linear, which is fine for per-file work.
    pub fn claim_next(&self) -> Option<FileIndex> {
        let mut claimed = self.claimed.lock();
        let index = claimed.iter().position(|taken| !taken)?;
        claimed[index] = true;
        Some(index)
    }

    pub fn path(&self, index: FileIndex) -> Option<&Path> {
        self.files.get(index).map(PathBuf::as_path)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of indices handed out so far
    pub fn claimed_count(&self) -> usize {
        self.claimed.lock().iter().filter(|taken| **taken).count()
    }
}
