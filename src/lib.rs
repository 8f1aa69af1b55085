//! Cross-Format Note Identity & Synchronization Engine
//!
//! Converts a score expressed in three format-incompatible representations
//! (symbolic MusicXML notes, performed MIDI events, rendered SVG glyphs)
//! into one consistent model where every musical event carries a stable
//! identity across all three. Matching runs under timing uncertainty with
//! confidence scoring; tied-note chains get interpolated timing; performed
//! events that belong to no notehead (trills, mordents, turns, grace notes)
//! are recovered, clustered and reconciled against the score's ornament
//! markup and the glyphs that render it.
//!
//! Parsing of the raw formats happens upstream; this crate consumes typed
//! inputs and exposes typed, serializable outputs.

pub mod engine;
pub mod matching;
pub mod models;
pub mod ornaments;
pub mod orphans;
pub mod registry;
pub mod ties;
pub mod timing;

// Re-export commonly used types
pub use engine::{SyncEngine, SyncInput, SyncOutput};
pub use matching::{MatchRecord, MatchStrategy, MatchType, MatcherConfig, NoteMatcher};
pub use models::event::PerformedEvent;
pub use models::glyph::{OrnamentType, RenderedGlyph, ScoreOrnament};
pub use models::note::{SymbolicNote, TiedGroup};
pub use models::pitch::{Accidental, PitchError, PitchName};
pub use registry::{IdentityRegistry, TimingPriority};
