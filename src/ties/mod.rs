//! Tied-note timing propagation.
//!
//! A group of symbolically tied notes collapses into one performed event.
//! Only the group's primary note gets the event's exact timing; subsequent
//! members get starts interpolated proportionally from their symbolic
//! durations, with decaying confidence so downstream animation can
//! distinguish authoritative from interpolated timing. The proportional
//! split is an approximation, not a guarantee.

use std::collections::HashMap;

use log::debug;
use num_rational::Rational64;
use serde::{Deserialize, Serialize};

use crate::matching::MatchRecord;
use crate::models::note::TiedGroup;

/// Where an assignment's timing came from
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimingSource {
    /// Directly from the matched performed event
    MidiExact,
    /// Interpolated inside the matched event's span
    MidiInterpolated,
    /// No performed event for the group; symbolic timing only
    XmlOnly,
}

/// Confidence given to members of a group with no matched event.
const XML_ONLY_CONFIDENCE: f64 = 0.25;

/// Calculated timing for one note of a tied group.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimingAssignment {
    pub note_id: String,
    pub tie_group: String,
    /// Position within the group, 0 = primary
    pub group_index: usize,
    pub calculated_start: f64,
    pub confidence: f64,
    pub source: TimingSource,
}

/// Assign timing to every member of every tied group.
///
/// Groups whose primary note has a match record are split inside the matched
/// event's span; members of unmatched groups fall back to their own symbolic
/// onsets rather than being dropped.
pub fn propagate(groups: &[TiedGroup], records: &[MatchRecord]) -> Vec<TimingAssignment> {
    let by_note: HashMap<&str, &MatchRecord> =
        records.iter().map(|r| (r.note_id.as_str(), r)).collect();

    let mut assignments = Vec::new();

    for group in groups {
        let primary = match group.primary() {
            Some(primary) => primary,
            None => continue,
        };

        let record = match by_note.get(primary.id.as_str()) {
            Some(record) => *record,
            None => {
                debug!(
                    "tie group {} has no matched primary, emitting symbolic timing",
                    group.id
                );
                for (index, member) in group.members.iter().enumerate() {
                    assignments.push(TimingAssignment {
                        note_id: member.id.clone(),
                        tie_group: group.id.clone(),
                        group_index: index,
                        calculated_start: member.onset_seconds,
                        confidence: XML_ONLY_CONFIDENCE,
                        source: TimingSource::XmlOnly,
                    });
                }
                continue;
            }
        };

        let event_start = record.event.start;
        let event_span = record.event.end - record.event.start;
        let total = group.total_duration();
        let mut elapsed = Rational64::new(0, 1);

        for (index, member) in group.members.iter().enumerate() {
            let assignment = if index == 0 {
                TimingAssignment {
                    note_id: member.id.clone(),
                    tie_group: group.id.clone(),
                    group_index: 0,
                    calculated_start: event_start,
                    confidence: 1.0,
                    source: TimingSource::MidiExact,
                }
            } else {
                let proportion = if total > Rational64::new(0, 1) {
                    let ratio = elapsed / total;
                    *ratio.numer() as f64 / *ratio.denom() as f64
                } else {
                    0.0
                };
                TimingAssignment {
                    note_id: member.id.clone(),
                    tie_group: group.id.clone(),
                    group_index: index,
                    calculated_start: event_start + proportion * event_span,
                    confidence: (0.9 - 0.2 * index as f64).max(0.3),
                    source: TimingSource::MidiInterpolated,
                }
            };
            assignments.push(assignment);
            elapsed += member.duration_beats;
        }
    }

    assignments
}
