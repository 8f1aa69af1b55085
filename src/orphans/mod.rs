//! Orphan recovery: finding performed events that matched no symbolic note
//! and clustering them into windows between matched "anchor" events.
//!
//! Orphans are usually ornament expansions: the extra notes a trill, mordent,
//! turn or grace produces in performance. Clusters carry a pitch-pattern
//! classification so the reconciler can tell a trill apart from, say, an
//! arpeggiated chord.

pub mod patterns;

pub use patterns::{classify_pattern, ClusterPattern, PatternRegistry, DEFAULT_PATTERNS};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::matching::MatchRecord;
use crate::models::event::{EventKey, PerformedEvent};

/// A contiguous run of unmatched performed events bounded by two anchors.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrphanCluster {
    /// Member events in start-time order
    pub events: Vec<PerformedEvent>,
    /// The anchor bounding the window on the left
    pub anchor_before: EventKey,
    /// The anchor bounding the window on the right
    pub anchor_after: EventKey,
    /// Half-open window: starts at the left anchor's end
    pub window_start: f64,
    /// Half-open window: ends at the right anchor's start (exclusive)
    pub window_end: f64,
    pub pattern: ClusterPattern,
}

/// Result of one recovery pass. `anchor_count + orphan_count` always equals
/// the number of input events; orphans outside any anchor pair stay
/// unclustered but are still counted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrphanRecovery {
    pub clusters: Vec<OrphanCluster>,
    pub anchor_count: usize,
    pub orphan_count: usize,
}

/// Membership probe for anchor detection: pitch plus start time rounded to
/// milliseconds. This is an approximate identity, not the event's true key:
/// two events sharing pitch and near-identical start time are
/// indistinguishable to it. The true `EventKey` identities seed the set, so
/// the approximation only affects lookups, not the matched data itself.
fn anchor_probe(pitch: u8, start: f64) -> (u8, i64) {
    (pitch, (start * 1000.0).round() as i64)
}

/// Partition events into anchors (already matched) and orphans, then cluster
/// orphans into the windows between consecutive anchors.
pub fn recover(all_events: &[PerformedEvent], records: &[MatchRecord]) -> OrphanRecovery {
    let matched: std::collections::HashSet<(u8, i64)> = records
        .iter()
        .map(|r| anchor_probe(r.event.pitch, r.event.start))
        .collect();

    let mut anchors: Vec<&PerformedEvent> = Vec::new();
    let mut orphans: Vec<&PerformedEvent> = Vec::new();
    for event in all_events {
        if matched.contains(&anchor_probe(event.pitch, event.start)) {
            anchors.push(event);
        } else {
            orphans.push(event);
        }
    }
    anchors.sort_by(|a, b| {
        a.start
            .partial_cmp(&b.start)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(
        "orphan recovery: {} anchors, {} orphans",
        anchors.len(),
        orphans.len()
    );

    let mut clusters = Vec::new();
    let mut clustered = vec![false; orphans.len()];

    for pair in anchors.windows(2) {
        let (before, after) = (pair[0], pair[1]);
        let window_start = before.end;
        let window_end = after.start;

        let mut members = Vec::new();
        for (index, orphan) in orphans.iter().enumerate() {
            if clustered[index] {
                continue;
            }
            if orphan.start >= window_start && orphan.start < window_end {
                clustered[index] = true;
                members.push((*orphan).clone());
            }
        }
        if members.is_empty() {
            continue;
        }

        PerformedEvent::sort_by_start(&mut members);
        let pattern = classify_pattern(&members);
        clusters.push(OrphanCluster {
            events: members,
            anchor_before: before.key(),
            anchor_after: after.key(),
            window_start,
            window_end,
            pattern,
        });
    }

    OrphanRecovery {
        clusters,
        anchor_count: anchors.len(),
        orphan_count: orphans.len(),
    }
}
