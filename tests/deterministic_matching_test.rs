use num_rational::Rational64;
use score_sync::matching::{DeterministicMatcher, MatchMethod, MatcherConfig, NoteMatcher};
use score_sync::models::note::{GraceType, NotePosition, TieRole};
use score_sync::{PerformedEvent, PitchName, SymbolicNote};

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

fn event(pitch: u8, start: f64) -> PerformedEvent {
    PerformedEvent {
        pitch,
        velocity: 64,
        start,
        end: start + 0.4,
        channel: 0,
        track_index: 0,
        track_name: None,
    }
}

#[test]
fn test_grace_note_matched_via_lookahead() {
    // Grace G4 immediately before principal A4 at 1.0s; the performance
    // plays the grace at 0.95s.
    let mut grace = note("g1", "G4", 1.0);
    grace.grace = Some(GraceType::Acciaccatura);
    let principal = note("n1", "A4", 1.0);
    let events = vec![event(67, 0.95), event(69, 1.0)];

    let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
    let records = matcher.match_notes(&[grace, principal], &events);

    let grace_record = records
        .iter()
        .find(|r| r.note_id == "g1")
        .expect("grace note should match");
    assert_eq!(grace_record.method, MatchMethod::GraceLookahead);
    assert!(grace_record.confidence >= 0.85);
    assert_eq!(grace_record.event.pitch, 67);
    assert!((grace_record.event.start - 0.95).abs() < 1e-9);

    let principal_record = records
        .iter()
        .find(|r| r.note_id == "n1")
        .expect("principal should match");
    assert_eq!(principal_record.event.pitch, 69);
}

#[test]
fn test_grace_in_other_part_does_not_cross() {
    let mut grace = note("g1", "G4", 1.0);
    grace.grace = Some(GraceType::Appoggiatura);
    grace.position.part_id = "P2".to_string();
    // Only principal is in P1; grace has no principal in its own part
    let principal = note("n1", "A4", 1.0);
    let events = vec![event(67, 0.95), event(69, 1.0)];

    let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
    let records = matcher.match_notes(&[grace, principal], &events);
    assert!(records.iter().all(|r| r.note_id != "g1"));
}

#[test]
fn test_same_record_shape_as_tolerance_matcher() {
    // A consumer serializing records is agnostic to which strategy ran
    let notes = vec![note("n1", "C4", 0.0)];
    let events = vec![event(60, 0.0)];

    let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
    let records = matcher.match_notes(&notes, &events);
    let json = serde_json::to_string(&records).unwrap();
    let back: Vec<score_sync::MatchRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, records);
}

#[test]
fn test_enharmonic_spelling_only_as_fallback() {
    // Two candidates for written Db4: one spelled exactly is impossible
    // (from_midi always spells sharps), so the enharmonic ladder applies
    let notes = vec![note("n1", "Db4", 0.0)];
    let events = vec![event(61, 0.0)];

    let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
    let records = matcher.match_notes(&notes, &events);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].method, MatchMethod::PitchNameEnharmonic);
    assert!((records[0].confidence - 0.8).abs() < 1e-9);
}

#[test]
fn test_deterministic_exclusivity_and_reset() {
    let notes = vec![note("n1", "C4", 0.0), note("n2", "C4", 0.25)];
    let events = vec![event(60, 0.0)];

    let mut matcher = DeterministicMatcher::new(MatcherConfig::default());
    let first_pass = matcher.match_notes(&notes, &events);
    assert_eq!(first_pass.len(), 1);
    assert_eq!(first_pass[0].note_id, "n1");

    matcher.reset();
    let second_pass = matcher.match_notes(&notes, &events);
    assert_eq!(second_pass.len(), 1);
}
