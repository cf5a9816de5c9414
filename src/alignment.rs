//! Time alignment of provider series
//!
//! Providers answer in their own local time and on their own grid. Naive
//! timestamps are taken as provider-local; timestamps carrying an offset are
//! converted into the provider offset before comparison.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, Timelike, Utc};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Local hours that never count towards a riding day
pub const NIGHT_START_HOUR: u32 = 22;
pub const NIGHT_END_HOUR: u32 = 4;

/// Parse a provider timestamp into provider-local wall time
#[must_use]
pub fn parse_provider_time(timestamp: &str, offset: FixedOffset) -> Option<NaiveDateTime> {
    let timestamp = timestamp.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(with_offset.with_timezone(&offset).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
}

/// Offset for `utc_offset_seconds`, UTC when out of range
#[must_use]
pub fn offset_from_seconds(utc_offset_seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_seconds).unwrap_or_else(|| Utc.fix())
}

/// Wall-clock time at the provider for a UTC instant
#[must_use]
pub fn provider_local(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDateTime {
    now.with_timezone(&offset).naive_local()
}

/// UTC instant of a provider-local wall time
#[must_use]
pub fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    (local - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Index of the sample closest to `target_local`.
///
/// Ties resolve to the first occurrence. Unparseable timestamps are skipped;
/// an empty or fully unparseable series yields 0.
#[must_use]
pub fn nearest_index(timestamps: &[String], target_local: NaiveDateTime, offset: FixedOffset) -> usize {
    let mut best: Option<(usize, i64)> = None;

    for (index, raw) in timestamps.iter().enumerate() {
        let Some(sample) = parse_provider_time(raw, offset) else {
            continue;
        };
        let delta = (sample - target_local).num_seconds().abs();
        match best {
            Some((_, best_delta)) if delta >= best_delta => {}
            _ => best = Some((index, delta)),
        }
    }

    best.map_or(0, |(index, _)| index)
}

/// Hours in `[22, 24)` and `[0, 4]`
#[must_use]
pub fn is_night_hour(hour: u32) -> bool {
    hour >= NIGHT_START_HOUR || hour <= NIGHT_END_HOUR
}

/// Indices whose provider-local date is `target_date`, optionally without night hours
#[must_use]
pub fn indices_for_local_date(
    timestamps: &[String],
    utc_offset_seconds: i32,
    target_date: NaiveDate,
    exclude_night_hours: bool,
) -> Vec<usize> {
    let offset = offset_from_seconds(utc_offset_seconds);

    timestamps
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let local = parse_provider_time(raw, offset)?;
            if local.date() != target_date {
                return None;
            }
            if exclude_night_hours && is_night_hour(local.hour()) {
                return None;
            }
            Some(index)
        })
        .collect()
}
