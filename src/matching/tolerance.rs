//! Tolerance matcher: confidence-scored greedy assignment inside a timing
//! window. Meant for live or expressive performances where onsets drift.

use log::debug;

use super::allocator::MatchAllocator;
use super::records::{MatchMethod, MatchRecord, MatchType};
use super::{sorted_by_onset, MatcherConfig, NoteMatcher};
use crate::models::event::PerformedEvent;
use crate::models::note::SymbolicNote;

/// Fraction of the tolerance window inside which an exact-pitch match is
/// classified Exact rather than Tolerance.
const EXACT_WINDOW_FRACTION: f64 = 0.25;

/// Velocity band considered musically normal for context scoring
const MUSICAL_VELOCITY: std::ops::RangeInclusive<u8> = 40..=100;

/// Events shorter than this are likely artifacts, not intentional notes
const MIN_INTENTIONAL_DURATION: f64 = 0.05;

pub struct ToleranceMatcher {
    config: MatcherConfig,
    allocator: MatchAllocator,
}

struct Candidate<'a> {
    event: &'a PerformedEvent,
    confidence: f64,
    time_delta: f64,
    timing_score: f64,
    pitch_score: f64,
    context_score: f64,
}

impl ToleranceMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            allocator: MatchAllocator::new(),
        }
    }

    /// Pitch compatibility: 1.0 for the exact MIDI number; with strict
    /// pitch off, anything within one octave stays a candidate, scored 0.7
    /// for the same pitch class an octave away and 0.0 otherwise (timing
    /// and context alone must then clear the confidence bar).
    fn pitch_score(&self, note_midi: u8, event_pitch: u8) -> Option<f64> {
        if note_midi == event_pitch {
            return Some(1.0);
        }
        if self.config.strict_pitch {
            return None;
        }
        let diff = (note_midi as i16 - event_pitch as i16).abs();
        if diff == 12 {
            Some(0.7)
        } else if diff < 12 {
            Some(0.0)
        } else {
            None
        }
    }

    /// Context plausibility in [0, 1]: base 0.5, plus instrument-name
    /// overlap, a musical velocity, and a non-trivial duration.
    fn context_score(&self, note: &SymbolicNote, event: &PerformedEvent) -> f64 {
        let mut score: f64 = 0.5;

        if let (Some(instrument), Some(track)) = (&note.instrument, &event.track_name) {
            let a = instrument.to_lowercase();
            let b = track.to_lowercase();
            if !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a)) {
                score += 0.3;
            }
        }
        if MUSICAL_VELOCITY.contains(&event.velocity) {
            score += 0.1;
        }
        if event.duration() > MIN_INTENTIONAL_DURATION {
            score += 0.1;
        }

        score.min(1.0)
    }

    fn best_candidate<'a>(
        &self,
        note: &SymbolicNote,
        note_midi: u8,
        events: &'a [PerformedEvent],
    ) -> Option<Candidate<'a>> {
        let tolerance = self.config.tolerance_seconds;
        let mut best: Option<Candidate<'a>> = None;

        for event in events {
            if self.allocator.event_consumed(&event.key()) {
                continue;
            }
            let pitch_score = match self.pitch_score(note_midi, event.pitch) {
                Some(score) => score,
                None => continue,
            };
            let time_delta = (note.onset_seconds - event.start).abs();
            if time_delta > tolerance {
                continue;
            }

            let timing_score = (1.0 - time_delta / tolerance).max(0.0);
            let context_score = self.context_score(note, event);
            let confidence = 0.4 * timing_score + 0.4 * pitch_score + 0.2 * context_score;

            // First seen wins on equal confidence, keeping the pass
            // deterministic over the globally ordered event list.
            let better = match &best {
                Some(current) => confidence > current.confidence,
                None => true,
            };
            if better {
                best = Some(Candidate {
                    event,
                    confidence,
                    time_delta,
                    timing_score,
                    pitch_score,
                    context_score,
                });
            }
        }

        best
    }

    fn classify(&self, exact_pitch: bool, time_delta: f64) -> MatchType {
        let tolerance = self.config.tolerance_seconds;
        if exact_pitch && time_delta < tolerance * EXACT_WINDOW_FRACTION {
            MatchType::Exact
        } else if exact_pitch && time_delta < tolerance {
            MatchType::Tolerance
        } else {
            MatchType::Approximate
        }
    }
}

impl NoteMatcher for ToleranceMatcher {
    fn match_notes(
        &mut self,
        notes: &[SymbolicNote],
        events: &[PerformedEvent],
    ) -> Vec<MatchRecord> {
        let mut records = Vec::new();

        for note in sorted_by_onset(notes) {
            let note_midi = match note.pitch.midi_number() {
                Ok(midi) => midi,
                Err(err) => {
                    // Fatal to this note only; the batch continues.
                    debug!("skipping note {}: {}", note.id, err);
                    continue;
                }
            };

            let candidate = match self.best_candidate(note, note_midi, events) {
                Some(candidate) => candidate,
                None => continue,
            };

            if candidate.confidence < self.config.min_confidence {
                debug!(
                    "note {} best candidate below threshold ({:.3} < {:.3})",
                    note.id, candidate.confidence, self.config.min_confidence
                );
                continue;
            }

            self.allocator.consume(&note.id, candidate.event.key());
            let exact_pitch = candidate.pitch_score >= 1.0;
            debug!(
                "matched {} -> pitch {} at {:.3}s (confidence {:.3})",
                note.id, candidate.event.pitch, candidate.event.start, candidate.confidence
            );

            records.push(MatchRecord {
                note_id: note.id.clone(),
                event: candidate.event.clone(),
                confidence: candidate.confidence,
                time_delta: candidate.time_delta,
                exact_pitch,
                timing_score: candidate.timing_score,
                context_score: candidate.context_score,
                method: MatchMethod::ToleranceWindow,
                match_type: self.classify(exact_pitch, candidate.time_delta),
            });
        }

        records
    }

    fn reset(&mut self) {
        self.allocator.reset();
    }
}
