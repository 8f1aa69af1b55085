//! Pitch-pattern classification for orphan clusters, plus the pluggable
//! registry of per-ornament validators used by the reconciler.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::OrphanCluster;
use crate::models::event::PerformedEvent;
use crate::models::glyph::OrnamentType;

/// Computed pitch-pattern shape of a cluster.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ClusterPattern {
    /// True for a rapid two-pitch alternation (the trill shape): at least
    /// two members, exactly two distinct pitches, and no consecutive
    /// same-pitch repeat anywhere in the sequence.
    pub rapid_alternation: bool,
    pub distinct_pitches: usize,
    /// Semitone distance between the two pitches of an alternation
    pub pitch_interval: Option<u8>,
}

/// Classify the pitch pattern of events already sorted by start time.
pub fn classify_pattern(events: &[PerformedEvent]) -> ClusterPattern {
    let mut distinct: Vec<u8> = Vec::new();
    for event in events {
        if !distinct.contains(&event.pitch) {
            distinct.push(event.pitch);
        }
    }

    let no_consecutive_repeat = events
        .windows(2)
        .all(|pair| pair[0].pitch != pair[1].pitch);
    let rapid_alternation = events.len() >= 2 && distinct.len() == 2 && no_consecutive_repeat;

    let pitch_interval = if distinct.len() == 2 {
        Some((distinct[0] as i16 - distinct[1] as i16).unsigned_abs() as u8)
    } else {
        None
    };

    ClusterPattern {
        rapid_alternation,
        distinct_pitches: distinct.len(),
        pitch_interval,
    }
}

/// Cluster validator for one ornament type.
pub type PatternValidator = Box<dyn Fn(&OrphanCluster) -> bool + Send + Sync>;

/// Registry of per-ornament-type cluster validators.
///
/// The reconciler asks the registry whether a cluster's shape is compatible
/// with an ornament type; new validators slot in per type without touching
/// the reconciliation control flow.
pub struct PatternRegistry {
    validators: BTreeMap<OrnamentType, PatternValidator>,
}

impl PatternRegistry {
    pub fn empty() -> Self {
        Self {
            validators: BTreeMap::new(),
        }
    }

    pub fn register(
        &mut self,
        ornament_type: OrnamentType,
        validator: impl Fn(&OrphanCluster) -> bool + Send + Sync + 'static,
    ) {
        self.validators.insert(ornament_type, Box::new(validator));
    }

    /// True when the cluster's shape is compatible with the ornament type.
    /// Types without a registered validator accept nothing.
    pub fn accepts(&self, ornament_type: OrnamentType, cluster: &OrphanCluster) -> bool {
        self.validators
            .get(&ornament_type)
            .map(|validator| validator(cluster))
            .unwrap_or(false)
    }
}

impl Default for PatternRegistry {
    /// Trills require the alternation shape. Mordent, turn and grace
    /// validators accept any cluster in range for now.
    /// TODO: mordent should require a three-note neighbor figure and turn a
    /// four-note one; tighten these once real SVG corpora are regression
    /// tested.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(OrnamentType::Trill, |cluster: &OrphanCluster| {
            cluster.pattern.rapid_alternation
        });
        registry.register(OrnamentType::Mordent, |_| true);
        registry.register(OrnamentType::Turn, |_| true);
        registry.register(OrnamentType::Grace, |_| true);
        registry
    }
}

/// Shared default registry for callers that don't customize validators.
pub static DEFAULT_PATTERNS: Lazy<PatternRegistry> = Lazy::new(PatternRegistry::default);
