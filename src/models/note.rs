//! Symbolic note model: one notated event from the score, plus the tie-group
//! structure that joins notes sharing a single performed sound.

use std::collections::BTreeMap;

use num_rational::Rational64;
use serde::{Deserialize, Serialize};

use super::pitch::PitchName;

/// Role of a note inside tie markup
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TieRole {
    #[default]
    None,
    Start,
    Continue,
    Stop,
}

/// Grace-note flavor
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GraceType {
    /// Crushed grace note, takes no nominal time
    Acciaccatura,
    /// Leaning grace note, borrows time from the principal
    Appoggiatura,
}

/// Where a note sits in the score
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NotePosition {
    /// Measure number (1-based, as printed)
    pub measure: u32,
    /// Beat offset within the measure
    pub beat: f64,
    /// Voice within the part
    pub voice: u8,
    /// Part (instrument) identifier, e.g. "P1"
    pub part_id: String,
    /// Staff index, used for track alignment against MIDI
    pub staff: usize,
}

/// One notated event. Created once per parse of the score; immutable after.
///
/// Onset times are monotonically non-decreasing within a part when notes are
/// visited in document order; the matchers rely on that for deterministic
/// greedy processing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SymbolicNote {
    /// Stable identity, unique within the score
    pub id: String,
    pub pitch: PitchName,
    /// Symbolic duration in beats
    pub duration_beats: Rational64,
    pub position: NotePosition,
    /// Onset in seconds, derived from cumulative beat position and tempo
    pub onset_seconds: f64,
    #[serde(default)]
    pub tie: TieRole,
    /// Identity of the tie group this note belongs to, if any
    #[serde(default)]
    pub tie_group: Option<String>,
    #[serde(default)]
    pub grace: Option<GraceType>,
    /// Instrument name as printed, used for context scoring
    #[serde(default)]
    pub instrument: Option<String>,
}

impl SymbolicNote {
    pub fn is_grace(&self) -> bool {
        self.grace.is_some()
    }

    pub fn is_tied(&self) -> bool {
        self.tie != TieRole::None
    }
}

/// An ordered sequence of symbolic notes joined by ties, sharing one
/// performed event. The first member (earliest onset) is the primary: the
/// only one eligible for direct MIDI timing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TiedGroup {
    pub id: String,
    /// Members sorted by onset time
    pub members: Vec<SymbolicNote>,
}

impl TiedGroup {
    /// Group notes by their tie-group identity. Members are sorted by onset
    /// time; groups come out ordered by group id for deterministic iteration.
    pub fn collect(notes: &[SymbolicNote]) -> Vec<TiedGroup> {
        let mut groups: BTreeMap<String, Vec<SymbolicNote>> = BTreeMap::new();
        for note in notes {
            if let Some(group_id) = &note.tie_group {
                groups.entry(group_id.clone()).or_default().push(note.clone());
            }
        }
        groups
            .into_iter()
            .map(|(id, mut members)| {
                members.sort_by(|a, b| {
                    a.onset_seconds
                        .partial_cmp(&b.onset_seconds)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                TiedGroup { id, members }
            })
            .collect()
    }

    /// The only member eligible for direct MIDI timing
    pub fn primary(&self) -> Option<&SymbolicNote> {
        self.members.first()
    }

    /// Total symbolic duration in beats, the basis for proportional timing
    pub fn total_duration(&self) -> Rational64 {
        self.members
            .iter()
            .map(|n| n.duration_beats)
            .sum()
    }
}
