//! Session-scoped window of recently shown cards.

use crate::types::CardId;
use std::collections::VecDeque;

/// Default number of remembered cards.
pub const DEFAULT_RECENCY_CAPACITY: usize = 50;

/// Bounded FIFO of card ids; the oldest entry is evicted first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencyWindow {
    entries: VecDeque<CardId>,
    capacity: usize,
}

impl Default for RecencyWindow {
    fn default() -> Self {
        Self::new(DEFAULT_RECENCY_CAPACITY)
    }
}

impl RecencyWindow {
    /// A capacity of zero disables the window.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.entries.contains(&id)
    }

    pub fn record(&mut self, id: CardId) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_back(id);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Forget a card, e.g. after it was deleted.
    pub fn forget(&mut self, id: CardId) {
        self.entries.retain(|entry| *entry != id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Most recently recorded id.
    pub fn last(&self) -> Option<CardId> {
        self.entries.back().copied()
    }
}
