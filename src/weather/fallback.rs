//! Deterministic fallback payloads
//!
//! Each provider role has a synthetic 24-hour series of plausible constants,
//! stamped hourly from the current hour onwards in UTC. Every fallback
//! satisfies the same validity check as a live payload of that role.

use std::collections::BTreeMap;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde_json::Value;

use super::ProviderKind;
use crate::models::{HourlyTable, InstantBlock, RawProviderPayload};
use crate::normalize::metric;

pub const FALLBACK_HOURS: usize = 24;

const STANDARD_HOURLY: [(&str, f64); 8] = [
    (metric::TEMPERATURE, 20.0),
    (metric::WIND_SPEED, 5.0),
    (metric::WIND_GUSTS, 7.0),
    (metric::WIND_DIRECTION, 180.0),
    (metric::HUMIDITY, 60.0),
    (metric::PRESSURE, 1013.0),
    (metric::VISIBILITY, 10_000.0),
    (metric::UV_INDEX, 3.0),
];

const STANDARD_INSTANT: [(&str, f64); 5] = [
    (metric::TEMPERATURE, 20.0),
    (metric::WIND_SPEED, 5.0),
    (metric::WIND_GUSTS, 7.0),
    (metric::WIND_DIRECTION, 180.0),
    (metric::UV_INDEX, 3.0),
];

const MARINE_HOURLY: [(&str, f64); 8] = [
    (metric::WAVE_HEIGHT, 0.5),
    (metric::WAVE_PERIOD, 5.0),
    (metric::WAVE_DIRECTION, 180.0),
    (metric::WIND_WAVE_HEIGHT, 0.3),
    (metric::WIND_WAVE_PERIOD, 4.0),
    (metric::SWELL_WAVE_HEIGHT, 0.2),
    (metric::SWELL_WAVE_PERIOD, 6.0),
    (metric::SEA_SURFACE_TEMPERATURE, 15.0),
];

const MODEL_HOURLY: [(&str, f64); 4] = [
    (metric::WIND_SPEED, 5.0),
    (metric::WIND_GUSTS, 7.0),
    (metric::WIND_DIRECTION, 180.0),
    (metric::TEMPERATURE, 20.0),
];

const CROSS_CHECK_INSTANT: [(&str, f64); 2] = [(metric::WIND_SPEED, 5.0), (metric::WIND_GUSTS, 7.0)];

fn hourly_table(start: DateTime<Utc>, columns: &[(&str, f64)]) -> HourlyTable {
    let time = (0..FALLBACK_HOURS)
        .map(|hour| {
            let stamp = start + TimeDelta::hours(hour as i64);
            stamp.format("%Y-%m-%dT%H:%M").to_string()
        })
        .collect();

    let metrics = columns
        .iter()
        .map(|(name, value)| ((*name).to_string(), Value::from(vec![*value; FALLBACK_HOURS])))
        .collect::<BTreeMap<_, _>>();

    HourlyTable {
        time: Some(time),
        metrics,
    }
}

fn instant_block(columns: &[(&str, f64)]) -> InstantBlock {
    columns
        .iter()
        .map(|(name, value)| ((*name).to_string(), Value::from(*value)))
        .collect()
}

/// Synthetic payload for a provider role
#[must_use]
pub fn fallback_payload(kind: ProviderKind, now: DateTime<Utc>) -> RawProviderPayload {
    let start = now.duration_trunc(TimeDelta::hours(1)).unwrap_or(now);

    let (hourly, current) = match kind {
        ProviderKind::Standard => (
            Some(hourly_table(start, &STANDARD_HOURLY)),
            Some(instant_block(&STANDARD_INSTANT)),
        ),
        ProviderKind::Marine => (Some(hourly_table(start, &MARINE_HOURLY)), None),
        ProviderKind::ModelRun => (Some(hourly_table(start, &MODEL_HOURLY)), None),
        ProviderKind::CrossCheck => (None, Some(instant_block(&CROSS_CHECK_INSTANT))),
    };

    RawProviderPayload {
        utc_offset_seconds: Some(0),
        hourly,
        current,
    }
}
