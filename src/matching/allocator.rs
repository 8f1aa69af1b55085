//! Consumption allocator: the mutual-exclusivity state of one matching pass.
//!
//! Owns both "used" sets (consumed performed events, consumed symbolic
//! notes) so exclusivity never leaks across unrelated runs. Matchers hold
//! one allocator each; `reset` gives a fresh pass on the same instance.

use std::collections::HashSet;

use crate::models::event::EventKey;

#[derive(Debug, Default, Clone)]
pub struct MatchAllocator {
    consumed_events: HashSet<EventKey>,
    consumed_notes: HashSet<String>,
}

impl MatchAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark both sides of an accepted match as consumed.
    pub fn consume(&mut self, note_id: &str, event: EventKey) {
        self.consumed_notes.insert(note_id.to_string());
        self.consumed_events.insert(event);
    }

    pub fn event_consumed(&self, key: &EventKey) -> bool {
        self.consumed_events.contains(key)
    }

    pub fn note_consumed(&self, note_id: &str) -> bool {
        self.consumed_notes.contains(note_id)
    }

    pub fn consumed_event_count(&self) -> usize {
        self.consumed_events.len()
    }

    /// Clear both sets for a fresh pass.
    pub fn reset(&mut self) {
        self.consumed_events.clear();
        self.consumed_notes.clear();
    }
}
