//! Aggregate statistics over one matching pass, serializable for offline
//! inspection and quality reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::records::{MatchRecord, MatchType};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MatchStatistics {
    pub total_notes: usize,
    pub matched_notes: usize,
    /// matched / total, 0.0 when the score is empty
    pub match_rate: f64,
    pub average_confidence: f64,
    /// Mean absolute timing error over matched records, seconds
    pub average_timing_error: f64,
    /// Count per match classification
    pub match_type_counts: BTreeMap<MatchType, usize>,
}

impl MatchStatistics {
    pub fn from_records(total_notes: usize, records: &[MatchRecord]) -> Self {
        let matched_notes = records.len();
        let match_rate = if total_notes > 0 {
            matched_notes as f64 / total_notes as f64
        } else {
            0.0
        };

        let (average_confidence, average_timing_error) = if records.is_empty() {
            (0.0, 0.0)
        } else {
            let confidence_sum: f64 = records.iter().map(|r| r.confidence).sum();
            let delta_sum: f64 = records.iter().map(|r| r.time_delta).sum();
            (
                confidence_sum / matched_notes as f64,
                delta_sum / matched_notes as f64,
            )
        };

        let mut match_type_counts = BTreeMap::new();
        for record in records {
            *match_type_counts.entry(record.match_type).or_insert(0) += 1;
        }

        Self {
            total_notes,
            matched_notes,
            match_rate,
            average_confidence,
            average_timing_error,
            match_type_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::records::MatchMethod;
    use crate::models::event::PerformedEvent;

    fn record(confidence: f64, time_delta: f64, match_type: MatchType) -> MatchRecord {
        MatchRecord {
            note_id: "n".to_string(),
            event: PerformedEvent {
                pitch: 60,
                velocity: 64,
                start: 0.0,
                end: 0.4,
                channel: 0,
                track_index: 0,
                track_name: None,
            },
            confidence,
            time_delta,
            exact_pitch: true,
            timing_score: 1.0,
            context_score: 0.5,
            method: MatchMethod::ToleranceWindow,
            match_type,
        }
    }

    #[test]
    fn test_empty_inputs() {
        let stats = MatchStatistics::from_records(0, &[]);
        assert_eq!(stats.match_rate, 0.0);
        assert_eq!(stats.average_confidence, 0.0);
        assert!(stats.match_type_counts.is_empty());
    }

    #[test]
    fn test_aggregates() {
        let records = vec![
            record(0.9, 0.01, MatchType::Exact),
            record(0.7, 0.03, MatchType::Tolerance),
            record(0.5, 0.08, MatchType::Exact),
        ];
        let stats = MatchStatistics::from_records(4, &records);

        assert_eq!(stats.matched_notes, 3);
        assert!((stats.match_rate - 0.75).abs() < 1e-9);
        assert!((stats.average_confidence - 0.7).abs() < 1e-9);
        assert!((stats.average_timing_error - 0.04).abs() < 1e-9);
        assert_eq!(stats.match_type_counts[&MatchType::Exact], 2);
        assert_eq!(stats.match_type_counts[&MatchType::Tolerance], 1);
    }
}
