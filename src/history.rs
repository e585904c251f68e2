use std::collections::VecDeque;
use std::mem;

use log::debug;

use crate::subtitle_processor::Document;

// @module: Linear undo/redo over full document snapshots

/// Undo and redo stacks of document snapshots
///
/// Snapshots are deep copies, so no stored state aliases the live document. Taking a
/// new snapshot discards every redo state.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    // @field: Oldest snapshot at the front
    undo: VecDeque<Document>,

    // @field: Most recently undone state at the back
    redo: Vec<Document>,

    // @field: Maximum undo depth, 0 = unlimited
    limit: usize,
}

impl EditHistory {
    /// Unlimited history
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` undo states (0 = unlimited)
    pub fn with_limit(limit: usize) -> Self {
        EditHistory {
            limit,
            ..Self::default()
        }
    }

    fn push_undo(&mut self, state: Document) {
        self.undo.push_back(state);
        if self.limit > 0 && self.undo.len() > self.limit {
            self.undo.pop_front();
            debug!("History limit {} reached, dropped oldest snapshot", self.limit);
        }
    }

    /// Record `current` before a mutation
    pub fn snapshot(&mut self, current: &Document) {
        self.push_undo(current.clone());
        self.redo.clear();
    }

    /// Restore the previous state; returns false when there is nothing to undo
    pub fn undo(&mut self, current: &mut Document) -> bool {
        match self.undo.pop_back() {
            Some(previous) => {
                self.redo.push(mem::replace(current, previous));
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone state; returns false when there is nothing to redo
    pub fn redo(&mut self, current: &mut Document) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let replaced = mem::replace(current, next);
                self.push_undo(replaced);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Drop every stored state
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
