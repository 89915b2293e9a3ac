//! Bounded, linear undo/redo history of whole-tree snapshots.
//!
//! Snapshots are [`Forest`] values, so storing one costs a pointer bump and
//! consecutive snapshots share every subtree the edit between them did not
//! touch. `present` is the live tree; the editor state reads it from here,
//! so the two can never drift apart.

use pb_core::model::Forest;
use std::collections::VecDeque;

/// Maximum number of undo steps kept by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    /// Oldest first.
    past: VecDeque<Forest>,
    present: Forest,
    /// Next redo first.
    future: VecDeque<Forest>,
    limit: usize,
}

impl History {
    pub fn new(present: Forest, limit: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT) + 1),
            present,
            future: VecDeque::new(),
            limit,
        }
    }

    /// Make `next` the present, pushing the old present onto `past`.
    /// Evicts the oldest snapshots past the limit and clears `future`.
    pub fn record(&mut self, next: Forest) {
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Step back one snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Step forward one snapshot. Returns `false` when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        true
    }

    /// Drop all snapshots and start over from `present`.
    pub fn reset(&mut self, present: Forest) {
        self.past.clear();
        self.future.clear();
        self.present = present;
    }

    pub fn present(&self) -> &Forest {
        &self.present
    }

    pub fn past(&self) -> &VecDeque<Forest> {
        &self.past
    }

    pub fn future(&self) -> &VecDeque<Forest> {
        &self.future
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Forest::new(), DEFAULT_HISTORY_LIMIT)
    }
}
