//! Unit tests for the shared work registry
//!
//! Tests ordering, exhaustion and at-most-once claiming under
//! concurrent workers.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crate::registry::*;

fn paths(count: usize) -> Vec<PathBuf> {
    (0..count).map(|i| PathBuf::from(format!("in/{:03}.wav", i))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_claims_lowest_index_first() {
        let registry = WorkRegistry::new(paths(3));

        assert_eq!(registry.claim_next(), Some(0));
        assert_eq!(registry.claim_next(), Some(1));
        assert_eq!(registry.claim_next(), Some(2));
        assert_eq!(registry.claimed_count(), 3);
    }

    #[test]
    fn test_exhausted_registry_keeps_returning_none() {
        let registry = WorkRegistry::new(paths(1));

        assert_eq!(registry.claim_next(), Some(0));
        for _ in 0..3 {
            assert_eq!(registry.claim_next(), None);
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = WorkRegistry::new(Vec::new());

        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.claim_next(), None);
    }

    #[test]
    fn test_paths_are_index_aligned() {
        let files = paths(4);
        let registry = WorkRegistry::new(files.clone());

        let index = registry.claim_next().unwrap();
        assert_eq!(registry.path(index), Some(files[0].as_path()));
        assert_eq!(registry.path(4), None);
        assert_eq!(registry.files(), files.as_slice());
    }

    #[test]
    fn test_concurrent_claims_are_disjoint() {
        let registry = Arc::new(WorkRegistry::new(paths(500)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let mut mine = Vec::new();
                    while let Some(index) = registry.claim_next() {
                        mine.push(index);
                    }
                    mine
                })
            })
            .collect();

        let mut all: Vec<FileIndex> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();

        assert_eq!(all, (0..500).collect::<Vec<_>>(), "Every index claimed exactly once");
        assert_eq!(registry.claim_next(), None);
    }

    proptest! {
        #[test]
        fn prop_claims_cover_every_index_once(
            files in 0usize..64,
            workers in 1usize..6,
        ) {
            let registry = Arc::new(WorkRegistry::new(paths(files)));

            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let registry = Arc::clone(&registry);
                    thread::spawn(move || {
                        std::iter::from_fn(|| registry.claim_next()).collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut all: Vec<FileIndex> = handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect();
            all.sort_unstable();

            prop_assert_eq!(all, (0..files).collect::<Vec<_>>());
            prop_assert_eq!(registry.claimed_count(), files);
        }
    }
}
