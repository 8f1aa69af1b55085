//! Performed event model: one MIDI note-on/note-off pair with wall-clock
//! timing, plus the synthetic key used for membership tests.

use serde::{Deserialize, Serialize};

/// Synthetic identity for a performed event, derived from track, start time
/// and pitch. Used only for equality and set membership, never shown to
/// users or persisted as a public identifier.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub track: usize,
    /// Start time in microseconds
    pub start_us: i64,
    pub pitch: u8,
}

/// One performed MIDI note, immutable once derived from the MIDI stream.
/// Events are globally ordered by start time for deterministic iteration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PerformedEvent {
    /// MIDI pitch number 0-127
    pub pitch: u8,
    /// MIDI velocity 0-127
    pub velocity: u8,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub channel: u8,
    pub track_index: usize,
    #[serde(default)]
    pub track_name: Option<String>,
}

impl PerformedEvent {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn key(&self) -> EventKey {
        EventKey {
            track: self.track_index,
            start_us: (self.start * 1_000_000.0).round() as i64,
            pitch: self.pitch,
        }
    }

    /// Sort a slice of events into global start-time order (stable).
    pub fn sort_by_start(events: &mut [PerformedEvent]) {
        events.sort_by(|a, b| {
            a.start
                .partial_cmp(&b.start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}
