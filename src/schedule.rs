//! Wall-clock resolution over the itinerary: which record is "current",
//! and which records have already passed.
//!
//! Everything here is a pure function of the record list and an evaluation
//! instant; nothing is cached between calls.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::itinerary::ItineraryRecord;

/// Which current-index algorithm to run. The historical implementations
/// drifted between the two; both stay reachable behind this flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverPolicy {
    /// Partition by calendar date first, then match intervals within today.
    #[default]
    DateAware,
    /// Ignore dates entirely; match intervals across the whole sequence.
    DateBlind,
}

/// Parse a `DD/MM/YYYY` day token. Anything else is an opaque label.
#[must_use]
pub fn parse_day_date(token: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(token.trim(), "%d/%m/%Y").ok()
}

/// Parse `H:MM`/`HH:MM` (24-hour) or `H:MM AM/PM` to minutes since
/// midnight. Seconds are tolerated and ignored. Returns `None` for
/// anything unparseable; missing times never match temporal checks.
#[must_use]
pub fn time_to_minutes(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let upper = raw.to_ascii_uppercase();
    let (clock_part, meridiem) = if let Some(stripped) = upper.strip_suffix("AM") {
        (stripped.trim_end().to_string(), Some(false))
    } else if let Some(stripped) = upper.strip_suffix("PM") {
        (stripped.trim_end().to_string(), Some(true))
    } else {
        (upper, None)
    };

    let mut parts = clock_part.split(':');
    let hours: u32 = parts.next()?.trim().parse().ok()?;
    let minutes: u32 = parts.next()?.trim().parse().ok()?;
    if minutes >= 60 {
        return None;
    }

    let hours = match meridiem {
        Some(true) if hours != 12 => hours + 12,
        Some(false) if hours == 12 => 0,
        _ => hours,
    };
    if hours >= 24 {
        return None;
    }

    Some(hours * 60 + minutes)
}

#[must_use]
pub fn minutes_of(now: NaiveDateTime) -> u32 {
    now.time().hour() * 60 + now.time().minute()
}

/// Whether the `[start, end]` interval contains `now_min`, treating
/// `end < start` as an interval that crosses midnight.
#[must_use]
pub fn interval_contains(start: u32, end: u32, now_min: u32) -> bool {
    if end < start {
        now_min >= start || now_min <= end
    } else {
        (start..=end).contains(&now_min)
    }
}

/// Is this record in the past relative to `now`?
///
/// A parseable future date is never passed; a parseable past date always
/// is. On today's date (or with no parseable date) the record is passed
/// exactly when `now` is strictly after its end. For a midnight-spanning
/// interval (`end < start`) that means `now` lies in `[end, start)`, i.e.
/// after the interval closes on the following day.
#[must_use]
pub fn has_passed(record: &ItineraryRecord, now: NaiveDateTime) -> bool {
    if let Some(date) = parse_day_date(&record.day) {
        if date < now.date() {
            return true;
        }
        if date > now.date() {
            return false;
        }
    }

    let Some(end) = time_to_minutes(&record.end) else {
        // Without an end time there is nothing to be past.
        return false;
    };
    let now_min = minutes_of(now);

    match time_to_minutes(&record.start) {
        Some(start) if end < start => now_min >= end && now_min < start,
        _ => now_min > end,
    }
}

/// Resolve which record index best represents `now`.
///
/// Record order is authoritative: the first index satisfying a
/// containment or future condition wins, never the closest by magnitude.
/// Returns 0 when nothing matches (including an empty list).
#[must_use]
pub fn current_index(
    records: &[ItineraryRecord],
    now: NaiveDateTime,
    policy: ResolverPolicy,
) -> usize {
    match policy {
        ResolverPolicy::DateAware => current_index_date_aware(records, now),
        ResolverPolicy::DateBlind => current_index_date_blind(records, now),
    }
}

fn current_index_date_aware(records: &[ItineraryRecord], now: NaiveDateTime) -> usize {
    let now_min = minutes_of(now);
    let today: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| parse_day_date(&r.day) == Some(now.date()))
        .map(|(i, _)| i)
        .collect();

    if today.is_empty() {
        // No records for today: the first strictly-future date wins; a
        // record with no parseable date qualifies by future start instead
        // (date-blind fallback).
        for (i, record) in records.iter().enumerate() {
            match parse_day_date(&record.day) {
                Some(date) if date > now.date() => return i,
                Some(_) => {}
                None => {
                    if time_to_minutes(&record.start).is_some_and(|s| now_min < s) {
                        return i;
                    }
                }
            }
        }
        return 0;
    }

    for &i in &today {
        let record = &records[i];
        if let (Some(start), Some(end)) = (
            time_to_minutes(&record.start),
            time_to_minutes(&record.end),
        ) {
            if interval_contains(start, end, now_min) {
                return i;
            }
        }
    }

    for &i in &today {
        if time_to_minutes(&records[i].start).is_some_and(|s| now_min < s) {
            return i;
        }
    }

    // All of today's records are behind us; stay on the last one.
    *today.last().unwrap_or(&0)
}

fn current_index_date_blind(records: &[ItineraryRecord], now: NaiveDateTime) -> usize {
    let now_min = minutes_of(now);

    for (i, record) in records.iter().enumerate() {
        if let (Some(start), Some(end)) = (
            time_to_minutes(&record.start),
            time_to_minutes(&record.end),
        ) {
            if interval_contains(start, end, now_min) {
                return i;
            }
        }
    }

    for (i, record) in records.iter().enumerate() {
        if time_to_minutes(&record.start).is_some_and(|s| now_min < s) {
            return i;
        }
    }

    0
}
