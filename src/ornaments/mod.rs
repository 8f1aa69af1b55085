//! Ornament reconciliation: joining score ornament markup, the SVG glyph
//! that renders it, and the orphan MIDI cluster that performs it into one
//! three-way-verified record.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::models::glyph::{OrnamentType, RenderedGlyph, ScoreOrnament};
use crate::orphans::{OrphanCluster, PatternRegistry};
use crate::registry::IdentityRegistry;

/// How long after the decorated note's matched event a cluster may start and
/// still be attributed to the ornament, in seconds.
const CLUSTER_SEARCH_WINDOW: f64 = 0.5;

/// The unification record for one notated ornament. The three confirmation
/// flags are independent; `all_sources_matched` requires the rendered glyph
/// and the performed cluster both (the markup itself is confirmed by
/// construction). Created once per markup ornament, never mutated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrnamentRelationship {
    pub ornament_type: OrnamentType,
    /// Id of the decorated symbolic note
    pub note_id: String,
    /// Confirmed by score markup (true by construction)
    pub xml_confirmed: bool,
    /// A rendered glyph of the same ornament category exists
    pub svg_confirmed: bool,
    /// An orphan cluster of compatible shape performs the ornament
    pub midi_confirmed: bool,
    /// Performed events attributed to this one notated ornament
    pub cardinality: usize,
    /// Semitone interval of the performed alternation, when classified
    pub pitch_interval: Option<u8>,
    /// Index into the cluster list of the accepted cluster, for provenance
    pub cluster_index: Option<usize>,
    pub all_sources_matched: bool,
}

/// Reconcile each markup ornament against rendered glyphs and orphan
/// clusters.
///
/// A markup ornament whose note has no identity-registry entry is skipped
/// with a warning; an entry without a matched performed event produces a
/// relationship with `midi_confirmed = false`.
pub fn reconcile(
    ornaments: &[ScoreOrnament],
    glyphs: &[RenderedGlyph],
    clusters: &[OrphanCluster],
    registry: &IdentityRegistry,
    patterns: &PatternRegistry,
) -> Vec<OrnamentRelationship> {
    let mut relationships = Vec::new();

    for ornament in ornaments {
        let entry = match registry.get(&ornament.note_id) {
            Some(entry) => entry,
            None => {
                warn!(
                    "ornament {:?} on unknown note {}, skipping",
                    ornament.ornament_type, ornament.note_id
                );
                continue;
            }
        };

        // First glyph of the matching category. Spatial disambiguation
        // between same-type ornaments on one page is still open.
        let glyph = glyphs
            .iter()
            .find(|g| g.is_ornament() && g.ornament_type == Some(ornament.ornament_type));

        let cluster = entry.event.as_ref().and_then(|event| {
            find_cluster(ornament.ornament_type, event.end, clusters, patterns)
        });

        if let Some((_, found)) = cluster {
            debug!(
                "ornament {:?} on {} performed by {} orphan events",
                ornament.ornament_type,
                ornament.note_id,
                found.events.len()
            );
        }

        relationships.push(OrnamentRelationship {
            ornament_type: ornament.ornament_type,
            note_id: ornament.note_id.clone(),
            xml_confirmed: true,
            svg_confirmed: glyph.is_some(),
            midi_confirmed: cluster.is_some(),
            cardinality: cluster.map(|(_, c)| c.events.len()).unwrap_or(0),
            pitch_interval: cluster.and_then(|(_, c)| c.pattern.pitch_interval),
            cluster_index: cluster.map(|(index, _)| index),
            all_sources_matched: glyph.is_some() && cluster.is_some(),
        });
    }

    relationships
}

/// First cluster whose window opens within the search interval after the
/// decorated note's performed end, and whose shape the ornament type accepts.
fn find_cluster<'a>(
    ornament_type: OrnamentType,
    event_end: f64,
    clusters: &'a [OrphanCluster],
    patterns: &PatternRegistry,
) -> Option<(usize, &'a OrphanCluster)> {
    clusters.iter().enumerate().find(|(_, cluster)| {
        let offset = cluster.window_start - event_end;
        (0.0..=CLUSTER_SEARCH_WINDOW).contains(&offset)
            && patterns.accepts(ornament_type, cluster)
    })
}
