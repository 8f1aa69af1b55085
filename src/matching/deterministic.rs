//! Deterministic matcher: strict pitch-name heuristics with a fixed
//! confidence ladder, for MIDI whose timing is reliably quantized.
//!
//! Exact spelling beats enharmonic spelling; the enharmonic fallback only
//! runs when no exact-spelling candidate exists. Grace notes are located by
//! looking ahead to their principal note: they precede it in performance but
//! are visually attached to it.

use log::debug;

use super::allocator::MatchAllocator;
use super::records::{MatchMethod, MatchRecord, MatchType};
use super::{sorted_by_onset, MatcherConfig, NoteMatcher};
use crate::models::event::PerformedEvent;
use crate::models::note::SymbolicNote;
use crate::models::pitch::PitchName;

/// Coarse search window for quantized timing, in seconds.
const COARSE_WINDOW: f64 = 0.5;

const CONFIDENCE_EXACT: f64 = 0.9;
const CONFIDENCE_ENHARMONIC: f64 = 0.7;
const CONFIDENCE_GRACE: f64 = 0.85;
const TRACK_ALIGNMENT_BONUS: f64 = 0.1;
/// Below this, the exact-spelling result is weak enough to try enharmonics.
const ENHARMONIC_RETRY_THRESHOLD: f64 = 0.5;

pub struct DeterministicMatcher {
    config: MatcherConfig,
    allocator: MatchAllocator,
}

impl DeterministicMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            allocator: MatchAllocator::new(),
        }
    }

    fn track_aligned(note: &SymbolicNote, event: &PerformedEvent) -> bool {
        event.track_index == note.position.staff
    }

    /// Nearest unused event to `anchor_seconds` satisfying `accepts`.
    fn nearest_event<'a>(
        &self,
        events: &'a [PerformedEvent],
        anchor_seconds: f64,
        accepts: impl Fn(&PerformedEvent) -> bool,
    ) -> Option<&'a PerformedEvent> {
        let mut best: Option<(&PerformedEvent, f64)> = None;
        for event in events {
            if self.allocator.event_consumed(&event.key()) || !accepts(event) {
                continue;
            }
            let delta = (event.start - anchor_seconds).abs();
            if delta > COARSE_WINDOW {
                continue;
            }
            // Strictly-closer comparison keeps first-seen-wins determinism.
            let better = match best {
                Some((_, current)) => delta < current,
                None => true,
            };
            if better {
                best = Some((event, delta));
            }
        }
        best.map(|(event, _)| event)
    }

    /// Exact spelling, then enharmonic spelling when the exact pass came up
    /// too weak. Returns the event, confidence and method.
    fn pitch_name_candidate<'a>(
        &self,
        note: &SymbolicNote,
        note_midi: u8,
        events: &'a [PerformedEvent],
    ) -> Option<(&'a PerformedEvent, f64, MatchMethod)> {
        // Event spellings come from from_midi, which always picks sharps;
        // flat-written notes therefore land on the enharmonic rung.
        let exact = self.nearest_event(events, note.onset_seconds, |event| {
            event.pitch == note_midi && PitchName::from_midi(event.pitch) == note.pitch
        });
        let best_exact_confidence = exact
            .map(|event| {
                CONFIDENCE_EXACT
                    + if Self::track_aligned(note, event) {
                        TRACK_ALIGNMENT_BONUS
                    } else {
                        0.0
                    }
            })
            .unwrap_or(0.0);

        if let Some(event) = exact {
            if best_exact_confidence >= ENHARMONIC_RETRY_THRESHOLD {
                return Some((event, best_exact_confidence, MatchMethod::PitchNameExact));
            }
        }

        // Same sounding pitch, different spelling (Db4 written, C#4 played)
        let enharmonic = self.nearest_event(events, note.onset_seconds, |event| {
            event.pitch == note_midi && PitchName::from_midi(event.pitch) != note.pitch
        })?;
        let confidence = CONFIDENCE_ENHARMONIC
            + if Self::track_aligned(note, enharmonic) {
                TRACK_ALIGNMENT_BONUS
            } else {
                0.0
            };
        Some((enharmonic, confidence, MatchMethod::PitchNameEnharmonic))
    }

    /// Grace notes sound before their principal: find the next non-grace
    /// note in the same part and search near its onset for the grace pitch.
    fn grace_candidate<'a>(
        &self,
        grace: &SymbolicNote,
        grace_midi: u8,
        ordered_notes: &[&SymbolicNote],
        events: &'a [PerformedEvent],
    ) -> Option<(&'a PerformedEvent, f64, MatchMethod)> {
        let principal = ordered_notes.iter().find(|n| {
            !n.is_grace()
                && n.position.part_id == grace.position.part_id
                && n.onset_seconds >= grace.onset_seconds
        })?;

        let event = self.nearest_event(events, principal.onset_seconds, |event| {
            event.pitch == grace_midi
        })?;
        let confidence = CONFIDENCE_GRACE
            + if Self::track_aligned(grace, event) {
                TRACK_ALIGNMENT_BONUS
            } else {
                0.0
            };
        Some((event, confidence, MatchMethod::GraceLookahead))
    }
}

impl NoteMatcher for DeterministicMatcher {
    fn match_notes(
        &mut self,
        notes: &[SymbolicNote],
        events: &[PerformedEvent],
    ) -> Vec<MatchRecord> {
        let ordered = sorted_by_onset(notes);
        let mut records = Vec::new();

        for &note in &ordered {
            let note_midi = match note.pitch.midi_number() {
                Ok(midi) => midi,
                Err(err) => {
                    debug!("skipping note {}: {}", note.id, err);
                    continue;
                }
            };

            let candidate = if note.is_grace() {
                self.grace_candidate(note, note_midi, &ordered, events)
            } else {
                self.pitch_name_candidate(note, note_midi, events)
            };

            let (event, confidence, method) = match candidate {
                Some(found) => found,
                None => continue,
            };
            if confidence < self.config.min_confidence {
                continue;
            }

            self.allocator.consume(&note.id, event.key());
            let time_delta = (note.onset_seconds - event.start).abs();
            debug!(
                "matched {} -> pitch {} at {:.3}s via {:?} (confidence {:.2})",
                note.id, event.pitch, event.start, method, confidence
            );

            records.push(MatchRecord {
                note_id: note.id.clone(),
                event: event.clone(),
                confidence: confidence.min(1.0),
                time_delta,
                exact_pitch: true,
                timing_score: (1.0 - time_delta / COARSE_WINDOW).max(0.0),
                context_score: if Self::track_aligned(note, event) {
                    1.0
                } else {
                    0.5
                },
                method,
                match_type: match method {
                    MatchMethod::PitchNameEnharmonic => MatchType::Tolerance,
                    _ => MatchType::Exact,
                },
            });
        }

        records
    }

    fn reset(&mut self) {
        self.allocator.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::note::{GraceType, NotePosition, TieRole};
    use num_rational::Rational64;

    fn note(id: &str, pitch: &str, onset: f64) -> SymbolicNote {
        SymbolicNote {
            id: id.to_string(),
            pitch: PitchName::parse(pitch).unwrap(),
            duration_beats: Rational64::new(1, 1),
            position: NotePosition {
                measure: 1,
                beat: 0.0,
                voice: 1,
                part_id: "P1".to_string(),
                staff: 0,
            },
            onset_seconds: onset,
            tie: TieRole::None,
            tie_group: None,
            grace: None,
            instrument: None,
        }
    }

    fn event(pitch: u8, start: f64, track: usize) -> PerformedEvent {
        PerformedEvent {
            pitch,
            velocity: 64,
            start,
            end: start + 0.4,
            channel: 0,
            track_index: track,
            track_name: None,
        }
    }

    #[test]
    fn test_exact_pitch_ladder() {
        let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
        let notes = vec![note("n1", "C4", 0.0)];
        // Track 0 aligns with staff 0: 0.9 + 0.1
        let events = vec![event(60, 0.0, 0)];

        let records = matcher.match_notes(&notes, &events);
        assert_eq!(records.len(), 1);
        assert!((records[0].confidence - 1.0).abs() < 1e-9);
        assert_eq!(records[0].method, MatchMethod::PitchNameExact);
    }

    #[test]
    fn test_no_alignment_bonus_off_track() {
        let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
        let notes = vec![note("n1", "C4", 0.0)];
        let events = vec![event(60, 0.0, 3)];

        let records = matcher.match_notes(&notes, &events);
        assert!((records[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_enharmonic_fallback() {
        let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
        // Written Db4, performed event spells as C#4 (MIDI 61)
        let notes = vec![note("n1", "Db4", 0.0)];
        let events = vec![event(61, 0.0, 3)];

        let records = matcher.match_notes(&notes, &events);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method, MatchMethod::PitchNameEnharmonic);
        assert!((records[0].confidence - 0.7).abs() < 1e-9);
        assert_eq!(records[0].match_type, MatchType::Tolerance);
    }

    #[test]
    fn test_grace_note_lookahead() {
        let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
        let mut grace = note("g1", "G4", 1.0);
        grace.grace = Some(GraceType::Acciaccatura);
        let principal = note("n1", "A4", 1.0);
        // Grace performed just before the principal
        let events = vec![event(67, 0.95, 0), event(69, 1.0, 0)];

        let records = matcher.match_notes(&[grace, principal], &events);
        assert_eq!(records.len(), 2);
        let grace_record = records.iter().find(|r| r.note_id == "g1").unwrap();
        assert_eq!(grace_record.method, MatchMethod::GraceLookahead);
        assert!(grace_record.confidence >= 0.85);
        assert_eq!(grace_record.event.pitch, 67);
        assert!((grace_record.event.start - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_exclusivity_across_methods() {
        let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
        let notes = vec![note("n1", "C4", 0.0), note("n2", "C4", 0.1)];
        let events = vec![event(60, 0.0, 0)];

        let records = matcher.match_notes(&notes, &events);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].note_id, "n1");
    }

    #[test]
    fn test_nearest_event_wins() {
        let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
        let notes = vec![note("n1", "C4", 1.0)];
        let events = vec![event(60, 0.7, 0), event(60, 1.05, 0)];

        let records = matcher.match_notes(&notes, &events);
        assert!((records[0].event.start - 1.05).abs() < 1e-9);
    }
}
