//! One-call synchronization pipeline over all components.
//!
//! Runs the configured matcher, tied-note propagation, orphan recovery and
//! ornament reconciliation in order, then assembles the identity registry.
//! The engine is synchronous and pure over in-memory collections; callers
//! needing parallel passes construct one engine per pass.

use log::info;
use serde::{Deserialize, Serialize};

use crate::matching::{self, MatchRecord, MatchStatistics, MatcherConfig};
use crate::models::event::PerformedEvent;
use crate::models::glyph::{RenderedGlyph, ScoreOrnament};
use crate::models::note::{SymbolicNote, TiedGroup};
use crate::ornaments::{self, OrnamentRelationship};
use crate::orphans::{self, OrphanRecovery, PatternRegistry};
use crate::registry::IdentityRegistry;
use crate::ties::{self, TimingAssignment};

/// Typed inputs produced by the upstream parsing collaborators.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SyncInput {
    pub notes: Vec<SymbolicNote>,
    pub events: Vec<PerformedEvent>,
    pub glyphs: Vec<RenderedGlyph>,
    pub ornaments: Vec<ScoreOrnament>,
    /// (note id, glyph id) pairs from upstream spatial correlation of
    /// noteheads, attached to registry entries when present
    #[serde(default)]
    pub notehead_links: Vec<(String, String)>,
}

/// Everything the engine produces, serializable for offline inspection.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SyncOutput {
    pub registry: IdentityRegistry,
    pub records: Vec<MatchRecord>,
    pub statistics: MatchStatistics,
    pub assignments: Vec<TimingAssignment>,
    pub recovery: OrphanRecovery,
    pub relationships: Vec<OrnamentRelationship>,
}

pub struct SyncEngine {
    config: MatcherConfig,
    patterns: PatternRegistry,
}

impl SyncEngine {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            patterns: PatternRegistry::default(),
        }
    }

    /// Replace the default ornament pattern validators.
    pub fn with_patterns(mut self, patterns: PatternRegistry) -> Self {
        self.patterns = patterns;
        self
    }

    /// Run the full pipeline. Always returns a complete, internally
    /// consistent result set even when many notes stay unmatched.
    pub fn run(&self, input: &SyncInput) -> SyncOutput {
        let mut events = input.events.clone();
        PerformedEvent::sort_by_start(&mut events);

        let mut matcher = matching::matcher_for(&self.config);
        let records = matcher.match_notes(&input.notes, &events);
        let statistics = MatchStatistics::from_records(input.notes.len(), &records);

        let groups = TiedGroup::collect(&input.notes);
        let assignments = ties::propagate(&groups, &records);

        let recovery = orphans::recover(&events, &records);

        let mut registry = IdentityRegistry::from_matches(&input.notes, &records);
        for (note_id, glyph_id) in &input.notehead_links {
            if let Some(glyph) = input.glyphs.iter().find(|g| &g.id == glyph_id) {
                registry.attach_glyph(note_id, glyph.clone());
            }
        }

        let relationships = ornaments::reconcile(
            &input.ornaments,
            &input.glyphs,
            &recovery.clusters,
            &registry,
            &self.patterns,
        );

        // Each recovered expansion gets its own stable identity so downstream
        // consumers can animate the extra performed notes.
        for relationship in &relationships {
            if !relationship.midi_confirmed {
                continue;
            }
            let cluster = relationship
                .cluster_index
                .and_then(|index| recovery.clusters.get(index));
            let glyph = input
                .glyphs
                .iter()
                .find(|g| g.is_ornament() && g.ornament_type == Some(relationship.ornament_type))
                .cloned();
            registry.add_expansion(
                &relationship.note_id,
                relationship.ornament_type,
                cluster.and_then(|c| c.events.first().cloned()),
                glyph,
                if relationship.all_sources_matched {
                    0.9
                } else {
                    0.7
                },
            );
        }

        info!(
            "synchronized {} notes: {} matched ({:.0}% rate), {} orphan events, {} ornaments reconciled",
            input.notes.len(),
            records.len(),
            statistics.match_rate * 100.0,
            recovery.orphan_count,
            relationships.len()
        );

        SyncOutput {
            registry,
            records,
            statistics,
            assignments,
            recovery,
            relationships,
        }
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}
