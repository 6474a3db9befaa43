//! # History
//!
//! Snapshot-based undo/redo for one page.
//!
//! ## Design
//!
//! - Each entry is a structural copy of the page's roots, never a reference
//!   into the live tree
//! - `index` points at the entry matching the live tree
//! - Pushing discards everything after `index` (the redo branch)
//! - Capacity is bounded; the oldest entry is evicted first
//! - A snapshot equal to the current entry is not pushed
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new(50, page.elements.clone());
//!
//! page.elements = tree::remove(&page.elements, &id);
//! history.push(page.elements.clone());
//!
//! if let Some(previous) = history.undo() {
//!     page.elements = previous.to_vec();
//! }
//! ```

use canvas_protocol::Element;
use std::collections::VecDeque;

pub type Snapshot = Vec<Element>;

/// How a mutation is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Snapshot right after the mutation
    Immediate,
    /// Snapshot once edits have settled for the debounce delay
    Debounced,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    index: usize,
    capacity: usize,
}

impl History {
    /// Start a history whose first entry is `initial`
    pub fn new(capacity: usize, initial: Snapshot) -> Self {
        let mut entries = VecDeque::with_capacity(capacity.max(1));
        entries.push_back(initial);
        Self {
            entries,
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a snapshot. Returns false when it equals the current entry.
    pub fn push(&mut self, snapshot: Snapshot) -> bool {
        if self.entries.get(self.index) == Some(&snapshot) {
            return false;
        }

        // New action invalidates the redo branch
        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }

        self.index = self.entries.len() - 1;
        true
    }

    /// Step back and return the snapshot to restore
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward and return the snapshot to restore
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget everything and start over from `snapshot`
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.entries.clear();
        self.entries.push_back(snapshot);
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tag: &str) -> Snapshot {
        vec![Element::new("root", tag)]
    }

    #[test]
    fn test_history_creation() {
        let history = History::new(50, vec![]);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_undo_redo() {
        let mut history = History::new(50, snap("a"));
        assert!(history.push(snap("b")));
        assert!(history.push(snap("c")));
        assert!(history.can_undo());

        assert_eq!(history.undo().unwrap(), &snap("b"));
        assert!(history.can_redo());
        assert_eq!(history.undo().unwrap(), &snap("a"));
        assert!(history.undo().is_none());

        assert_eq!(history.redo().unwrap(), &snap("b"));
        assert_eq!(history.redo().unwrap(), &snap("c"));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_identical_snapshot_is_skipped() {
        let mut history = History::new(50, snap("a"));
        assert!(!history.push(snap("a")));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_new_push_clears_redo() {
        let mut history = History::new(50, snap("a"));
        history.push(snap("b"));
        history.push(snap("c"));
        history.undo();
        history.undo();
        assert!(history.can_redo());

        history.push(snap("d"));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().unwrap(), &snap("d"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::new(3, snap("0"));
        for i in 1..=5 {
            history.push(snap(&i.to_string()));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.undo().unwrap(), &snap("4"));
        assert_eq!(history.undo().unwrap(), &snap("3"));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_snapshots_are_independent_copies() {
        let mut live = snap("a");
        let mut history = History::new(10, live.clone());
        live[0].tag = "mutated".to_string();
        history.push(live.clone());

        assert_eq!(history.undo().unwrap()[0].tag, "a");
    }
}
