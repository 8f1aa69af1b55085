//! Identity registry: the externally visible product of the whole engine.
//!
//! One stable identity per symbolic note, plus one per recovered ornament
//! expansion, each carrying its resolved performed event and rendered glyph
//! references, a confidence, and a timing-priority flag telling downstream
//! consumers which source's timing to trust.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matching::MatchRecord;
use crate::models::event::PerformedEvent;
use crate::models::glyph::{OrnamentType, RenderedGlyph};
use crate::models::note::SymbolicNote;

/// Which source's timing downstream consumers should treat as ground truth
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimingPriority {
    Xml,
    Midi,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    Note,
    /// Extra performed notes recovered for one notated ornament
    OrnamentExpansion,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct IdentityEntry {
    pub kind: IdentityKind,
    /// Absent for ornament expansions, which have no single notated note
    pub note: Option<SymbolicNote>,
    pub event: Option<PerformedEvent>,
    pub glyph: Option<RenderedGlyph>,
    pub confidence: f64,
    pub timing_priority: TimingPriority,
    /// Ornament type for expansion entries
    #[serde(default)]
    pub ornament_type: Option<OrnamentType>,
}

/// Map from stable identity to resolved cross-format references. BTreeMap
/// keeps iteration and serialization order deterministic.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IdentityRegistry {
    entries: BTreeMap<String, IdentityEntry>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from one matching pass: an entry per note, with
    /// MIDI timing priority exactly when a performed event was matched.
    pub fn from_matches(notes: &[SymbolicNote], records: &[MatchRecord]) -> Self {
        let by_note: BTreeMap<&str, &MatchRecord> =
            records.iter().map(|r| (r.note_id.as_str(), r)).collect();

        let mut registry = Self::new();
        for note in notes {
            let record = by_note.get(note.id.as_str());
            registry.entries.insert(
                note.id.clone(),
                IdentityEntry {
                    kind: IdentityKind::Note,
                    note: Some(note.clone()),
                    event: record.map(|r| r.event.clone()),
                    glyph: None,
                    confidence: record.map(|r| r.confidence).unwrap_or(0.0),
                    timing_priority: if record.is_some() {
                        TimingPriority::Midi
                    } else {
                        TimingPriority::Xml
                    },
                    ornament_type: None,
                },
            );
        }
        registry
    }

    /// Attach a rendered notehead glyph to an existing identity.
    pub fn attach_glyph(&mut self, note_id: &str, glyph: RenderedGlyph) {
        if let Some(entry) = self.entries.get_mut(note_id) {
            entry.glyph = Some(glyph);
        }
    }

    /// Register one recovered ornament expansion. The identity is derived
    /// from the decorated note and the ornament type, so repeated runs
    /// produce the same key and a note carrying several ornament markups
    /// gets one entry per markup.
    pub fn add_expansion(
        &mut self,
        note_id: &str,
        ornament_type: OrnamentType,
        first_event: Option<PerformedEvent>,
        glyph: Option<RenderedGlyph>,
        confidence: f64,
    ) -> String {
        let id = format!("{}:ornament:{}", note_id, ornament_type.as_str());
        self.entries.insert(
            id.clone(),
            IdentityEntry {
                kind: IdentityKind::OrnamentExpansion,
                note: None,
                event: first_event,
                glyph,
                confidence,
                timing_priority: TimingPriority::Midi,
                ornament_type: Some(ornament_type),
            },
        );
        id
    }

    pub fn get(&self, id: &str) -> Option<&IdentityEntry> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IdentityEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
