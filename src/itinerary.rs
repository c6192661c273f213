//! Mapping tokenized spreadsheet rows into typed itinerary records, plus
//! the display formatters that live at the edge of that mapping.
//!
//! The source sheet is maintained by hand in two scripts: header names come
//! in Khmer and English variants, times in several shapes, and any field
//! may be blank. Mapping never fails; the worst case is an empty string.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::schedule::parse_day_date;

// Ordered alias lists per logical field; first header present wins.
// Lookup is case-insensitive, which collapses the sheet's historical
// casing variants.
const DAY_ALIASES: &[&str] = &["day", "date"];
const LOCATION_ALIASES: &[&str] = &["ទីតាំង", "location"];
const START_ALIASES: &[&str] = &["ផ្តើម", "start"];
const END_ALIASES: &[&str] = &["ចប់", "end"];
const DURATION_ALIASES: &[&str] = &["រយៈពេល", "duration"];
const ACTIVITY_ALIASES: &[&str] = &["សកម្មភាព", "description", "activity"];
const ABOUT_ALIASES: &[&str] = &["about"];
const IMAGE_ALIASES: &[&str] = &["image url", "imageurl", "image", "photo"];
const MAP_ALIASES: &[&str] = &["google map", "googlemap", "google maps", "map"];
const STATUS_ALIASES: &[&str] = &["status"];

/// One parsed itinerary row. Spreadsheet row order is the canonical
/// sequence; nothing here reorders it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryRecord {
    pub day: String,
    pub location: String,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub activity: String,
    pub about: String,
    pub image_url: String,
    pub google_map: String,
    pub status: String,
}

impl ItineraryRecord {
    /// The sheet drifted between "complete" and "completed"; both mark the
    /// record as done.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(
            self.status.trim().to_ascii_lowercase().as_str(),
            "complete" | "completed"
        )
    }
}

/// Case-insensitive header-name → column-index table. The first
/// occurrence of a duplicated header wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex(HashMap<String, usize>);

impl HeaderIndex {
    #[must_use]
    pub fn new(header: &[String]) -> Self {
        let mut map = HashMap::with_capacity(header.len());
        for (i, name) in header.iter().enumerate() {
            map.entry(name.trim().to_lowercase()).or_insert(i);
        }
        Self(map)
    }

    /// Resolve the first present alias to the row's value. Missing
    /// columns and short rows both yield the empty string.
    #[must_use]
    pub fn field<'a>(&self, row: &'a [String], aliases: &[&str]) -> &'a str {
        aliases
            .iter()
            .find_map(|name| self.0.get(&name.to_lowercase()))
            .and_then(|&i| row.get(i))
            .map_or("", |v| v.trim())
    }
}

/// Map data rows to records. Rows with neither an activity nor a location
/// are dropped; everything else degrades to empty strings.
#[must_use]
pub fn map_records(header: &[String], rows: &[Vec<String>]) -> Vec<ItineraryRecord> {
    let index = HeaderIndex::new(header);

    rows.iter()
        .map(|row| ItineraryRecord {
            day: index.field(row, DAY_ALIASES).to_string(),
            location: index.field(row, LOCATION_ALIASES).to_string(),
            start: format_time(index.field(row, START_ALIASES)),
            end: format_time(index.field(row, END_ALIASES)),
            duration: format_duration(index.field(row, DURATION_ALIASES)),
            activity: index.field(row, ACTIVITY_ALIASES).to_string(),
            about: index.field(row, ABOUT_ALIASES).to_string(),
            image_url: index.field(row, IMAGE_ALIASES).to_string(),
            google_map: index.field(row, MAP_ALIASES).to_string(),
            status: index.field(row, STATUS_ALIASES).to_string(),
        })
        .filter(|r| !r.activity.is_empty() || !r.location.is_empty())
        .collect()
}

/// Normalize a time cell to `H:MM AM/PM` display form.
///
/// - `10:20:00 AM` → `10:20 AM` (seconds stripped)
/// - `02/06/2025 14:30[:00]` → `02:30 PM` (reinterpreted as a local
///   date-time, short time kept)
/// - anything else passes through unchanged
#[must_use]
pub fn format_time(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    if let Some((clock, meridiem)) = split_meridiem(raw) {
        let mut parts = clock.split(':');
        if let (Some(h), Some(m)) = (parts.next(), parts.next()) {
            if h.chars().all(|c| c.is_ascii_digit()) && m.len() == 2 && m.chars().all(|c| c.is_ascii_digit()) {
                return format!("{h}:{m} {meridiem}");
            }
        }
        return raw.to_string();
    }

    for pattern in ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%I:%M %p").to_string();
        }
    }

    raw.to_string()
}

fn split_meridiem(raw: &str) -> Option<(&str, &'static str)> {
    let upper = raw.to_ascii_uppercase();
    if let Some(clock_len) = upper.strip_suffix("AM").map(str::len) {
        Some((raw[..clock_len].trim_end(), "AM"))
    } else if let Some(clock_len) = upper.strip_suffix("PM").map(str::len) {
        Some((raw[..clock_len].trim_end(), "PM"))
    } else {
        None
    }
}

/// Humanize an `H:MM:SS` duration cell: `1:30:00` → `1 Hour 30 Min`,
/// `2:00:00` → `2 Hours`, `0:45:00` → `45 Min`. Unparseable input passes
/// through unchanged; empty input stays empty.
#[must_use]
pub fn format_duration(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let mut parts = raw.split(':');
    let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
        return raw.to_string();
    };
    let (Ok(hours), Ok(minutes)) = (h.trim().parse::<u32>(), m.trim().parse::<u32>()) else {
        return raw.to_string();
    };

    let hour_word = if hours == 1 { "Hour" } else { "Hours" };
    match (hours, minutes) {
        (0, 0) => raw.to_string(),
        (0, m) => format!("{m} Min"),
        (h, 0) => format!("{h} {hour_word}"),
        (h, m) => format!("{h} {hour_word} {m} Min"),
    }
}

/// Day tokens mapped to sequential 1-based day numbers.
///
/// Unique tokens sort chronologically where they parse as `DD/MM/YYYY`;
/// non-date tokens sort after all dates, alphabetically among themselves.
/// The mapping only feeds human-readable labels; it never reorders the
/// record sequence.
#[derive(Debug, Clone, Default)]
pub struct DayNumbering(HashMap<String, usize>);

impl DayNumbering {
    #[must_use]
    pub fn build(records: &[ItineraryRecord]) -> Self {
        let mut tokens: Vec<&str> = Vec::new();
        for record in records {
            let token = record.day.trim();
            if !token.is_empty() && !tokens.contains(&token) {
                tokens.push(token);
            }
        }

        tokens.sort_by(|a, b| match (parse_day_date(a), parse_day_date(b)) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.cmp(b),
        });

        Self(
            tokens
                .into_iter()
                .enumerate()
                .map(|(i, t)| (t.to_string(), i + 1))
                .collect(),
        )
    }

    #[must_use]
    pub fn number_for(&self, token: &str) -> Option<usize> {
        self.0.get(token.trim()).copied()
    }
}

/// Human label for a record's day token. `None` when the token is empty
/// (the shell hides the header in that case).
#[must_use]
pub fn day_label(token: &str, numbering: &DayNumbering) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if parse_day_date(token).is_some() {
        return Some(match numbering.number_for(token) {
            Some(n) => format!("Day {n}"),
            None => token.to_string(),
        });
    }

    if token.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("Day {token}"));
    }

    let lower = token.to_lowercase();
    let already_prefixed = lower
        .strip_prefix("day")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace));
    if !already_prefixed {
        return Some(format!("Day {token}"));
    }

    let mut chars = token.chars();
    let first = chars.next().map(|c| c.to_uppercase().to_string()).unwrap_or_default();
    Some(format!("{first}{}", chars.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(day: &str) -> ItineraryRecord {
        ItineraryRecord {
            day: day.to_string(),
            location: "x".to_string(),
            ..ItineraryRecord::default()
        }
    }

    mod mapper_tests {
        use super::*;

        fn header() -> Vec<String> {
            ["Day", "ទីតាំង", "ផ្តើម", "ចប់", "រយៈពេល", "សកម្មភាព", "Status"]
                .iter()
                .map(ToString::to_string)
                .collect()
        }

        fn row(fields: &[&str]) -> Vec<String> {
            fields.iter().map(ToString::to_string).collect()
        }

        #[test]
        fn test_khmer_headers_resolve() {
            let rows = vec![row(&[
                "01/06/2025",
                "Angkor Wat",
                "9:00:00 AM",
                "11:30:00 AM",
                "2:30:00",
                "Temple visit",
                "",
            ])];
            let records = map_records(&header(), &rows);
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].location, "Angkor Wat");
            assert_eq!(records[0].start, "9:00 AM");
            assert_eq!(records[0].end, "11:30 AM");
            assert_eq!(records[0].duration, "2 Hours 30 Min");
            assert_eq!(records[0].activity, "Temple visit");
        }

        #[test]
        fn test_short_rows_never_panic() {
            let rows = vec![row(&["01/06/2025", "Angkor Wat"])];
            let records = map_records(&header(), &rows);
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].start, "");
            assert_eq!(records[0].status, "");
        }

        #[test]
        fn test_alias_order_first_present_wins() {
            let header: Vec<String> = ["Description", "Activity"]
                .iter()
                .map(ToString::to_string)
                .collect();
            let rows = vec![row(&["from description", "from activity"])];
            let records = map_records(&header, &rows);
            assert_eq!(records[0].activity, "from description");
        }

        #[test]
        fn test_header_lookup_is_case_insensitive() {
            let header: Vec<String> = ["LOCATION", "IMAGE URL"]
                .iter()
                .map(ToString::to_string)
                .collect();
            let rows = vec![row(&["Phnom Penh", "https://img.example/a.jpg"])];
            let records = map_records(&header, &rows);
            assert_eq!(records[0].location, "Phnom Penh");
            assert_eq!(records[0].image_url, "https://img.example/a.jpg");
        }

        #[test]
        fn test_contentless_rows_are_dropped() {
            let rows = vec![row(&["01/06/2025", "", "", "", "", "", "done"])];
            assert!(map_records(&header(), &rows).is_empty());
        }

        #[test]
        fn test_completed_status_both_spellings() {
            let mut r = ItineraryRecord::default();
            for s in ["completed", "Complete", "COMPLETED", " complete "] {
                r.status = s.to_string();
                assert!(r.is_completed(), "{s}");
            }
            r.status = "pending".to_string();
            assert!(!r.is_completed());
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_time_strips_seconds() {
            assert_eq!(format_time("10:20:00 AM"), "10:20 AM");
            assert_eq!(format_time("9:05:30 pm"), "9:05 PM");
        }

        #[test]
        fn test_format_time_passthrough() {
            assert_eq!(format_time("10:20 AM"), "10:20 AM");
            assert_eq!(format_time("14:30"), "14:30");
            assert_eq!(format_time("whenever"), "whenever");
            assert_eq!(format_time(""), "");
        }

        #[test]
        fn test_format_time_datetime_cell() {
            assert_eq!(format_time("02/06/2025 14:30:00"), "02:30 PM");
            assert_eq!(format_time("02/06/2025 9:05"), "09:05 AM");
        }

        #[test]
        fn test_format_duration_variants() {
            assert_eq!(format_duration("1:30:00"), "1 Hour 30 Min");
            assert_eq!(format_duration("2:00:00"), "2 Hours");
            assert_eq!(format_duration("0:45:00"), "45 Min");
            assert_eq!(format_duration("4:00"), "4 Hours");
        }

        #[test]
        fn test_format_duration_passthrough() {
            assert_eq!(format_duration(""), "");
            assert_eq!(format_duration("soon"), "soon");
            assert_eq!(format_duration("0:00:00"), "0:00:00");
        }
    }

    mod day_label_tests {
        use super::*;

        #[test]
        fn test_dates_number_chronologically_nondates_after() {
            let records = vec![rec("02/06/2025"), rec("01/06/2025"), rec("Extra")];
            let numbering = DayNumbering::build(&records);
            assert_eq!(day_label("01/06/2025", &numbering).as_deref(), Some("Day 1"));
            assert_eq!(day_label("02/06/2025", &numbering).as_deref(), Some("Day 2"));
            assert_eq!(day_label("Extra", &numbering).as_deref(), Some("Day Extra"));
            assert_eq!(numbering.number_for("Extra"), Some(3));
        }

        #[test]
        fn test_numeric_token_gets_prefix() {
            let numbering = DayNumbering::default();
            assert_eq!(day_label("3", &numbering).as_deref(), Some("Day 3"));
        }

        #[test]
        fn test_existing_prefix_is_capitalized() {
            let numbering = DayNumbering::default();
            assert_eq!(day_label("day 4", &numbering).as_deref(), Some("Day 4"));
            assert_eq!(day_label("Day 4", &numbering).as_deref(), Some("Day 4"));
        }

        #[test]
        fn test_empty_token_hides_label() {
            assert_eq!(day_label("  ", &DayNumbering::default()), None);
        }

        #[test]
        fn test_unmapped_date_falls_back_to_token() {
            let numbering = DayNumbering::default();
            assert_eq!(
                day_label("05/06/2025", &numbering).as_deref(),
                Some("05/06/2025")
            );
        }
    }
}
