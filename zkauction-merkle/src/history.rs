//! Bounded FIFO window of recent accumulator roots.
//!
//! Proofs are generated against a snapshot of the tree and may arrive after
//! further mutations. Keeping the last `window` roots lets such proofs stay
//! valid for a bounded number of mutations; anything older must be
//! regenerated against a fresh root.

use std::collections::VecDeque;

use zkauction_common::{fr_to_bytes, Fr};

/// Sliding window over the most recent roots of one accumulator.
#[derive(Clone, Debug)]
pub struct RootHistory {
    window: usize,
    roots: VecDeque<Fr>,
}

impl RootHistory {
    /// Start a history seeded with the accumulator's initial root.
    ///
    /// A zero `window` is treated as 1: the current root is always accepted.
    pub fn new(window: usize, initial_root: Fr) -> Self {
        let window = window.max(1);
        let mut roots = VecDeque::with_capacity(window);
        roots.push_back(initial_root);
        Self { window, roots }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Record the root after a mutation, evicting the oldest past the window.
    pub fn record(&mut self, root: Fr) {
        if self.roots.len() == self.window {
            self.roots.pop_front();
        }
        self.roots.push_back(root);
    }

    /// The most recently recorded root.
    pub fn latest(&self) -> Fr {
        *self.roots.back().expect("history is never empty")
    }

    pub fn contains(&self, root: &Fr) -> bool {
        let key = fr_to_bytes(root);
        self.roots.iter().any(|r| fr_to_bytes(r) == key)
    }

    /// All in-window roots, oldest first.
    pub fn snapshot(&self) -> Vec<Fr> {
        self.roots.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_at_most_window_roots() {
        let mut history = RootHistory::new(3, Fr::from(0u64));
        for value in 1u64..=5 {
            history.record(Fr::from(value));
        }

        assert_eq!(history.snapshot().len(), 3);
        assert!(history.contains(&Fr::from(5u64)));
        assert!(history.contains(&Fr::from(3u64)));
        assert!(!history.contains(&Fr::from(2u64)));
        assert_eq!(history.latest(), Fr::from(5u64));
    }

    #[test]
    fn evicts_oldest_first() {
        let mut history = RootHistory::new(2, Fr::from(10u64));
        history.record(Fr::from(11u64));
        assert!(history.contains(&Fr::from(10u64)));
        history.record(Fr::from(12u64));
        assert!(!history.contains(&Fr::from(10u64)));
        assert_eq!(history.snapshot(), vec![Fr::from(11u64), Fr::from(12u64)]);
    }

    #[test]
    fn zero_window_still_tracks_current_root() {
        let mut history = RootHistory::new(0, Fr::from(1u64));
        history.record(Fr::from(2u64));
        assert!(history.contains(&Fr::from(2u64)));
        assert!(!history.contains(&Fr::from(1u64)));
    }
}
