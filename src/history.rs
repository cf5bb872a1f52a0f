//! Undo/redo history over any cloneable state driven by a reducer.
//!
//! Bursts of edits (typing into a label, say) collapse into one undo step:
//! a change that lands within the merge window of the previous one replaces
//! the present without recording a new past entry.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::config::DEFAULT_UNDO_MERGE_WINDOW_MS;

#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    pub past: Vec<T>,
    pub present: T,
    pub future: Vec<T>,
    /// Time of the last recorded change in milliseconds. Zero forces the
    /// next change to start a new step.
    pub last_update_ms: u64,
    merge_window_ms: u64,
}

impl<T: Clone + PartialEq> History<T> {
    #[must_use]
    pub fn new(present: T) -> Self {
        Self::with_merge_window(present, DEFAULT_UNDO_MERGE_WINDOW_MS)
    }

    #[must_use]
    pub fn with_merge_window(present: T, merge_window_ms: u64) -> Self {
        Self { past: Vec::new(), present, future: Vec::new(), last_update_ms: 0, merge_window_ms }
    }

    /// Apply `reducer` to the present. Returns whether the state changed.
    pub fn dispatch<A, R>(&mut self, action: A, now_ms: u64, reducer: R) -> bool
    where
        R: FnOnce(&T, A) -> T,
    {
        let next = reducer(&self.present, action);
        if next == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, next);
        if self.last_update_ms == 0 || now_ms.saturating_sub(self.last_update_ms) > self.merge_window_ms {
            self.past.push(previous);
        }
        self.future.clear();
        self.last_update_ms = now_ms;
        true
    }

    /// Step back one change. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        self.last_update_ms = 0;
        true
    }

    /// Re-apply one undone change. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        self.last_update_ms = 0;
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}
