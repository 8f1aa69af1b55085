//! Rendered glyph model (SVG extraction output) and score ornament markup.

use serde::{Deserialize, Serialize};

/// Category of a rendered SVG symbol
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GlyphCategory {
    Notehead,
    OrnamentMark,
}

/// Ornament kind, shared between score markup and rendered glyphs
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum OrnamentType {
    Trill,
    Mordent,
    Turn,
    Grace,
}

/// One SVG-rendered symbol: a notehead or an ornament mark.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RenderedGlyph {
    /// Glyph identity within the rendered page
    pub id: String,
    /// Pixel position in the rendered page
    pub x: f64,
    pub y: f64,
    pub staff_index: usize,
    pub category: GlyphCategory,
    /// Present when category is OrnamentMark
    #[serde(default)]
    pub ornament_type: Option<OrnamentType>,
    /// Notehead glyph this mark is attached to by spatial proximity
    /// (below for ornaments, to the right for grace notes)
    #[serde(default)]
    pub linked_notehead: Option<String>,
}

impl OrnamentType {
    /// Stable lowercase tag, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            OrnamentType::Trill => "trill",
            OrnamentType::Mordent => "mordent",
            OrnamentType::Turn => "turn",
            OrnamentType::Grace => "grace",
        }
    }
}

impl RenderedGlyph {
    pub fn is_ornament(&self) -> bool {
        self.category == GlyphCategory::OrnamentMark
    }
}

/// Ornament markup read from the score: a trill-mark, mordent, turn or
/// grace annotation attached to one symbolic note.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScoreOrnament {
    pub ornament_type: OrnamentType,
    /// Id of the SymbolicNote the markup decorates
    pub note_id: String,
    pub measure: u32,
}
