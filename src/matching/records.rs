//! Match records: the correspondence between one symbolic note and zero or
//! one performed event. Created by a matcher, never mutated after creation.

use serde::{Deserialize, Serialize};

use crate::models::event::PerformedEvent;

/// Coarse classification of how tight a match is
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Exact pitch, timing well inside the window
    Exact,
    /// Exact pitch, timing inside the window
    Tolerance,
    /// Octave-equivalent pitch or timing at the window edge
    Approximate,
}

/// Which heuristic produced a record
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    ToleranceWindow,
    PitchNameExact,
    PitchNameEnharmonic,
    GraceLookahead,
}

/// One accepted correspondence. A symbolic note has at most one record per
/// matching pass, and a performed event appears in at most one record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MatchRecord {
    /// Id of the matched SymbolicNote
    pub note_id: String,
    /// The consumed performed event (embedded copy)
    pub event: PerformedEvent,
    /// Overall confidence in [0, 1]
    pub confidence: f64,
    /// Absolute difference between symbolic onset and performed start, seconds
    pub time_delta: f64,
    pub exact_pitch: bool,
    /// Timing sub-score in [0, 1]
    pub timing_score: f64,
    /// Context sub-score in [0, 1]
    pub context_score: f64,
    pub method: MatchMethod,
    pub match_type: MatchType,
}
