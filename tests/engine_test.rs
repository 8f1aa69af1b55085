use num_rational::Rational64;
use score_sync::matching::{matcher_for, MatchStrategy, MatchType};
use score_sync::models::note::{NotePosition, TieRole};
use score_sync::orphans::DEFAULT_PATTERNS;
use score_sync::timing::{beats_to_seconds, TempoEntry, TempoMap};
use score_sync::{MatcherConfig, PerformedEvent, PitchName, SymbolicNote, SyncEngine, SyncInput};

fn note_at_beat(id: &str, pitch: &str, beat: f64, bpm: f64) -> SymbolicNote {
    SymbolicNote {
        id: id.to_string(),
        pitch: PitchName::parse(pitch).unwrap(),
        duration_beats: Rational64::new(1, 1),
        position: NotePosition {
            measure: 1,
            beat,
            voice: 1,
            part_id: "P1".to_string(),
            staff: 0,
        },
        onset_seconds: beats_to_seconds(beat, bpm),
        tie: TieRole::None,
        tie_group: None,
        grace: None,
        instrument: None,
    }
}

fn event(pitch: u8, start: f64, end: f64) -> PerformedEvent {
    PerformedEvent {
        pitch,
        velocity: 70,
        start,
        end,
        channel: 0,
        track_index: 0,
        track_name: None,
    }
}

#[test]
fn test_onsets_from_tempo_map_line_up_with_performance() {
    // A 120 BPM score: beat n lands at n/2 seconds. The tempo map agrees
    // with the hand-computed onsets used for the symbolic notes.
    let map = TempoMap::new(480, vec![TempoEntry { tick: 0, bpm: 120.0 }]);
    assert!((map.tick_to_seconds(960) - beats_to_seconds(2.0, 120.0)).abs() < 1e-9);

    let input = SyncInput {
        notes: vec![
            note_at_beat("n1", "C4", 0.0, 120.0),
            note_at_beat("n2", "E4", 1.0, 120.0),
            note_at_beat("n3", "G4", 2.0, 120.0),
        ],
        events: vec![
            event(60, 0.01, 0.45),
            event(64, 0.52, 0.95),
            event(67, 1.0, 1.45),
        ],
        glyphs: Vec::new(),
        ornaments: Vec::new(),
        notehead_links: Vec::new(),
    };

    let output = SyncEngine::new(MatcherConfig::default()).run(&input);
    assert_eq!(output.records.len(), 3);
    assert!((output.statistics.match_rate - 1.0).abs() < 1e-9);
    assert_eq!(output.recovery.orphan_count, 0);
}

#[test]
fn test_strategy_selected_by_configuration() {
    let notes = vec![note_at_beat("n1", "C4", 0.0, 120.0)];
    let events = vec![event(60, 0.0, 0.4)];

    // Both strategies run behind the same trait object and emit the same
    // record shape; only the method tag differs.
    for strategy in [MatchStrategy::Tolerance, MatchStrategy::Deterministic] {
        let config = MatcherConfig {
            strategy,
            ..MatcherConfig::default()
        };
        let mut matcher = matcher_for(&config);
        let records = matcher.match_notes(&notes, &events);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].match_type, MatchType::Exact);
    }
}

#[test]
fn test_config_defaults() {
    let config = MatcherConfig::default();
    assert!((config.tolerance_seconds - 0.1).abs() < 1e-9);
    assert!((config.min_confidence - 0.5).abs() < 1e-9);
    assert!(!config.strict_pitch);
    assert_eq!(config.strategy, MatchStrategy::Tolerance);

    // Round-trips through serde for pipeline configuration files
    let json = serde_json::to_string(&config).unwrap();
    let back: MatcherConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_engine_runs_are_deterministic() {
    let input = SyncInput {
        notes: vec![
            note_at_beat("n1", "C4", 0.0, 120.0),
            note_at_beat("n2", "D4", 1.0, 120.0),
            note_at_beat("n3", "E4", 2.0, 120.0),
        ],
        events: vec![
            event(60, 0.02, 0.45),
            event(61, 0.6, 0.66),
            event(62, 0.52, 0.95),
            event(64, 1.01, 1.45),
        ],
        glyphs: Vec::new(),
        ornaments: Vec::new(),
        notehead_links: Vec::new(),
    };

    let engine = SyncEngine::new(MatcherConfig::default());
    let first = serde_json::to_string(&engine.run(&input)).unwrap();
    let second = serde_json::to_string(&engine.run(&input)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_shared_default_pattern_registry() {
    // The lazily built shared registry behaves like a fresh default one
    let cluster_events = vec![event(61, 0.0, 0.06), event(60, 0.07, 0.13)];
    let pattern = score_sync::orphans::classify_pattern(&cluster_events);
    assert!(pattern.rapid_alternation);

    let cluster = score_sync::orphans::OrphanCluster {
        events: cluster_events,
        anchor_before: score_sync::models::event::EventKey {
            track: 0,
            start_us: 0,
            pitch: 60,
        },
        anchor_after: score_sync::models::event::EventKey {
            track: 0,
            start_us: 1_000_000,
            pitch: 62,
        },
        window_start: 0.0,
        window_end: 1.0,
        pattern,
    };
    assert!(DEFAULT_PATTERNS.accepts(score_sync::OrnamentType::Trill, &cluster));
}
