//! Pitch representation and conversion logic
//!
//! Western pitch names with accidentals and octaves, conversion to and from
//! MIDI note numbers, and enharmonic equivalence. All matchers build on this.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PitchError {
    #[error("unresolvable pitch name: {0}")]
    Unresolvable(String),
    #[error("pitch out of MIDI range (0-127): {0}")]
    OutOfRange(i16),
}

pub type Result<T> = std::result::Result<T, PitchError>;

/// Accidental applied to a pitch step
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Accidental {
    DoubleFlat,
    Flat,
    #[default]
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    /// Semitone offset from the natural step
    pub fn semitone_offset(&self) -> i16 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }

    /// Notation symbol ("", "#", "b", ...)
    pub fn symbol(&self) -> &'static str {
        match self {
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "##",
        }
    }
}

/// A notated pitch: step letter, accidental and octave (scientific notation,
/// C4 = middle C = MIDI 60).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PitchName {
    /// Step letter, uppercase (C, D, E, F, G, A, B)
    pub step: char,
    pub accidental: Accidental,
    pub octave: i8,
}

impl PitchName {
    pub fn new(step: char, accidental: Accidental, octave: i8) -> Self {
        Self {
            step: step.to_ascii_uppercase(),
            accidental,
            octave,
        }
    }

    /// Parse scientific pitch notation, e.g. "F#4", "Bb3", "C4", "G##2".
    pub fn parse(notation: &str) -> Result<PitchName> {
        let mut chars = notation.chars();
        let step = chars
            .next()
            .ok_or_else(|| PitchError::Unresolvable(notation.to_string()))?
            .to_ascii_uppercase();
        if !matches!(step, 'A'..='G') {
            return Err(PitchError::Unresolvable(notation.to_string()));
        }

        let rest: String = chars.collect();
        let (accidental, octave_part) = if let Some(r) = rest.strip_prefix("##") {
            (Accidental::DoubleSharp, r)
        } else if let Some(r) = rest.strip_prefix("bb") {
            (Accidental::DoubleFlat, r)
        } else if let Some(r) = rest.strip_prefix('#') {
            (Accidental::Sharp, r)
        } else if let Some(r) = rest.strip_prefix('b') {
            (Accidental::Flat, r)
        } else {
            (Accidental::Natural, rest.as_str())
        };

        let octave: i8 = octave_part
            .parse()
            .map_err(|_| PitchError::Unresolvable(notation.to_string()))?;

        Ok(PitchName::new(step, accidental, octave))
    }

    /// Semitones of the natural step above C
    fn step_semitones(&self) -> Result<i16> {
        match self.step {
            'C' => Ok(0),
            'D' => Ok(2),
            'E' => Ok(4),
            'F' => Ok(5),
            'G' => Ok(7),
            'A' => Ok(9),
            'B' => Ok(11),
            other => Err(PitchError::Unresolvable(other.to_string())),
        }
    }

    /// MIDI note number (C4 = 60), range-checked to 0-127.
    pub fn midi_number(&self) -> Result<u8> {
        let value = (self.octave as i16 + 1) * 12
            + self.step_semitones()?
            + self.accidental.semitone_offset();
        if (0..=127).contains(&value) {
            Ok(value as u8)
        } else {
            Err(PitchError::OutOfRange(value))
        }
    }

    /// Pitch class 0-11 (C = 0), independent of octave.
    pub fn pitch_class(&self) -> Result<u8> {
        Ok((self.midi_number()? % 12) as u8)
    }

    /// Spell a MIDI number with sharps (61 -> C#4).
    pub fn from_midi(midi: u8) -> PitchName {
        let octave = (midi / 12) as i8 - 1;
        let (step, accidental) = match midi % 12 {
            0 => ('C', Accidental::Natural),
            1 => ('C', Accidental::Sharp),
            2 => ('D', Accidental::Natural),
            3 => ('D', Accidental::Sharp),
            4 => ('E', Accidental::Natural),
            5 => ('F', Accidental::Natural),
            6 => ('F', Accidental::Sharp),
            7 => ('G', Accidental::Natural),
            8 => ('G', Accidental::Sharp),
            9 => ('A', Accidental::Natural),
            10 => ('A', Accidental::Sharp),
            _ => ('B', Accidental::Natural),
        };
        PitchName::new(step, accidental, octave)
    }

    /// Two spellings of the same sounding pitch (C#4 and Db4).
    pub fn is_enharmonic(&self, other: &PitchName) -> bool {
        match (self.midi_number(), other.midi_number()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Full notation string, e.g. "F#4"
    pub fn notation(&self) -> String {
        format!("{}{}{}", self.step, self.accidental.symbol(), self.octave)
    }
}

impl std::fmt::Display for PitchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.notation())
    }
}
