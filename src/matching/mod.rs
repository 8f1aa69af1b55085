//! Note matching: pairing symbolic notes with performed MIDI events.
//!
//! Two interchangeable strategies implement the [`NoteMatcher`] capability
//! and emit the same [`MatchRecord`] shape, so downstream code is agnostic
//! to which ran:
//!
//! - [`ToleranceMatcher`] scores candidates inside a timing window and is
//!   meant for live or expressive performances.
//! - [`DeterministicMatcher`] uses strict pitch-name heuristics with a fixed
//!   confidence ladder and is meant for reliably quantized MIDI.
//!
//! Selection between them is a configuration decision, not a runtime branch.

mod allocator;
mod deterministic;
mod records;
mod stats;
mod tolerance;

pub use allocator::MatchAllocator;
pub use deterministic::DeterministicMatcher;
pub use records::{MatchMethod, MatchRecord, MatchType};
pub use stats::MatchStatistics;
pub use tolerance::ToleranceMatcher;

use serde::{Deserialize, Serialize};

use crate::models::event::PerformedEvent;
use crate::models::note::SymbolicNote;

/// Which matcher implementation to run
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Confidence-scored matching inside a timing window
    #[default]
    Tolerance,
    /// Strict pitch-name heuristics for quantized timing
    Deterministic,
}

/// Matching configuration, shared by both strategies.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MatcherConfig {
    /// Timing window in seconds for candidate collection
    pub tolerance_seconds: f64,
    /// Minimum confidence for a candidate to be accepted
    pub min_confidence: f64,
    /// When true, octave-equivalent pitches are not candidates
    pub strict_pitch: bool,
    pub strategy: MatchStrategy,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            tolerance_seconds: 0.1,
            min_confidence: 0.5,
            strict_pitch: false,
            strategy: MatchStrategy::Tolerance,
        }
    }
}

/// A matching strategy over symbolic notes and performed events.
///
/// Implementations own a consumption allocator: a performed event is matched
/// to at most one note for the lifetime of one matcher instance. Callers
/// needing repeated passes construct a fresh matcher or call `reset`.
pub trait NoteMatcher {
    /// Run one matching pass. Notes are processed in ascending onset-time
    /// order regardless of input order; ties in candidate confidence break
    /// by iteration order (first seen wins), so the pass is deterministic.
    fn match_notes(
        &mut self,
        notes: &[SymbolicNote],
        events: &[PerformedEvent],
    ) -> Vec<MatchRecord>;

    /// Clear consumption state so the instance can run another pass.
    fn reset(&mut self);
}

/// Construct the matcher selected by the configuration.
pub fn matcher_for(config: &MatcherConfig) -> Box<dyn NoteMatcher> {
    match config.strategy {
        MatchStrategy::Tolerance => Box::new(ToleranceMatcher::new(config.clone())),
        MatchStrategy::Deterministic => Box::new(DeterministicMatcher::new(config.clone())),
    }
}

/// Sort note references into ascending onset order, stable so document order
/// breaks onset ties. Processing order affects greedy exclusivity and must
/// be deterministic.
pub(crate) fn sorted_by_onset<'a>(notes: &'a [SymbolicNote]) -> Vec<&'a SymbolicNote> {
    let mut sorted: Vec<&SymbolicNote> = notes.iter().collect();
    sorted.sort_by(|a, b| {
        a.onset_seconds
            .partial_cmp(&b.onset_seconds)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}
