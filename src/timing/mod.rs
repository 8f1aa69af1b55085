//! Tempo map and tick/beat to wall-clock conversion.
//!
//! Bridges symbolic positions (MIDI ticks, score beats) to seconds. The map
//! holds tempo changes ordered by tick; conversion walks the segments and
//! accumulates elapsed time at each tempo.

use serde::{Deserialize, Serialize};

/// Tempo fallback when the score carries no tempo at all.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// One tempo change
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TempoEntry {
    /// Tick position where this tempo takes effect
    pub tick: u64,
    pub bpm: f64,
}

/// Ordered tempo changes plus the tick resolution.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TempoMap {
    /// Ticks per quarter note (typically 480 or 960)
    pub tpq: u32,
    entries: Vec<TempoEntry>,
}

impl TempoMap {
    /// Build a map from tempo entries; entries are sorted by tick. An empty
    /// entry list falls back to 120 BPM throughout.
    pub fn new(tpq: u32, mut entries: Vec<TempoEntry>) -> Self {
        entries.sort_by_key(|e| e.tick);
        if entries.is_empty() {
            log::trace!("tempo map empty, falling back to {} BPM", DEFAULT_TEMPO_BPM);
        }
        Self { tpq, entries }
    }

    /// Tempo in effect at a given tick.
    pub fn bpm_at(&self, tick: u64) -> f64 {
        self.entries
            .iter()
            .take_while(|e| e.tick <= tick)
            .last()
            .map(|e| e.bpm)
            .unwrap_or(DEFAULT_TEMPO_BPM)
    }

    /// Convert an absolute tick position to seconds, walking each tempo
    /// segment up to the target tick.
    pub fn tick_to_seconds(&self, tick: u64) -> f64 {
        let mut seconds = 0.0;
        let mut cursor_tick = 0u64;
        let mut bpm = DEFAULT_TEMPO_BPM;

        for entry in &self.entries {
            if entry.tick >= tick {
                break;
            }
            // Time elapsed in the segment before this tempo change
            if entry.tick > cursor_tick {
                seconds += self.ticks_as_seconds(entry.tick - cursor_tick, bpm);
                cursor_tick = entry.tick;
            }
            bpm = entry.bpm;
        }

        seconds + self.ticks_as_seconds(tick - cursor_tick, bpm)
    }

    fn ticks_as_seconds(&self, ticks: u64, bpm: f64) -> f64 {
        let quarter_seconds = 60.0 / bpm;
        (ticks as f64 / self.tpq as f64) * quarter_seconds
    }
}

impl Default for TempoMap {
    fn default() -> Self {
        Self::new(480, Vec::new())
    }
}

/// Convert a duration in quarter-note beats to seconds at a given tempo.
pub fn beats_to_seconds(beats: f64, bpm: f64) -> f64 {
    beats * 60.0 / bpm
}
