//! The agenda view: the itinerary flattened into table rows plus summary
//! figures.

use serde::{Deserialize, Serialize};

use crate::itinerary::ItineraryRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaRow {
    /// 1-based table position.
    pub position: usize,
    pub day: String,
    pub activity: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub status: String,
    /// Lowercase status for the shell's styling hooks; "unknown" when the
    /// cell is empty.
    pub status_slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaSummary {
    pub total: usize,
    pub completed: usize,
    pub upcoming: usize,
    /// "first-day → last-day" when both ends are present.
    pub range: Option<String>,
    pub last_synced_ms: Option<u64>,
}

#[must_use]
pub fn build_rows(records: &[ItineraryRecord]) -> Vec<AgendaRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| AgendaRow {
            position: i + 1,
            day: record.day.clone(),
            activity: record.activity.clone(),
            location: record.location.clone(),
            start: record.start.clone(),
            end: record.end.clone(),
            duration: record.duration.clone(),
            status: record.status.clone(),
            status_slug: if record.status.is_empty() {
                "unknown".to_string()
            } else {
                record.status.to_lowercase()
            },
        })
        .collect()
}

#[must_use]
pub fn build_summary(records: &[ItineraryRecord], last_synced_ms: Option<u64>) -> AgendaSummary {
    let total = records.len();
    let completed = records.iter().filter(|r| r.is_completed()).count();

    let range = match (records.first(), records.last()) {
        (Some(first), Some(last)) if !first.day.is_empty() && !last.day.is_empty() => {
            Some(format!("{} → {}", first.day, last.day))
        }
        _ => None,
    };

    AgendaSummary {
        total,
        completed,
        upcoming: total - completed,
        range,
        last_synced_ms,
    }
}
