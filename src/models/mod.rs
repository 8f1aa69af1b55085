//! Typed input model: symbolic notes, performed events, rendered glyphs.
//!
//! Everything in this module is produced by upstream parsing collaborators
//! (MusicXML walker, MIDI decoder, SVG glyph extractor) and is immutable
//! once constructed.

pub mod event;
pub mod glyph;
pub mod note;
pub mod pitch;

pub use event::{EventKey, PerformedEvent};
pub use glyph::{GlyphCategory, OrnamentType, RenderedGlyph, ScoreOrnament};
pub use note::{GraceType, NotePosition, SymbolicNote, TieRole, TiedGroup};
pub use pitch::{Accidental, PitchError, PitchName};
