//! Normalization of raw provider payloads
//!
//! Every quantity is resolved in the same order: a numeric value from the
//! instant block, then the hourly value at the aligned index, then the
//! field's default. Unit conversion to knots happens here and nowhere else.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use tracing::debug;

use crate::alignment::{local_to_utc, nearest_index, parse_provider_time, provider_local};
use crate::models::{Location, NormalizedConditions, RawProviderPayload};

pub const KNOTS_PER_MS: f64 = 1.944;

/// Open-Meteo metric names shared by every provider mapping
pub mod metric {
    pub const TEMPERATURE: &str = "temperature_2m";
    pub const HUMIDITY: &str = "relative_humidity_2m";
    pub const PRESSURE: &str = "pressure_msl";
    pub const WIND_SPEED: &str = "wind_speed_10m";
    pub const WIND_DIRECTION: &str = "wind_direction_10m";
    pub const WIND_GUSTS: &str = "wind_gusts_10m";
    pub const VISIBILITY: &str = "visibility";
    pub const UV_INDEX: &str = "uv_index";
    pub const WAVE_HEIGHT: &str = "wave_height";
    pub const WAVE_PERIOD: &str = "wave_period";
    pub const WAVE_DIRECTION: &str = "wave_direction";
    pub const WIND_WAVE_HEIGHT: &str = "wind_wave_height";
    pub const WIND_WAVE_PERIOD: &str = "wind_wave_period";
    pub const SWELL_WAVE_HEIGHT: &str = "swell_wave_height";
    pub const SWELL_WAVE_PERIOD: &str = "swell_wave_period";
    pub const SEA_SURFACE_TEMPERATURE: &str = "sea_surface_temperature";
}

#[must_use]
pub fn ms_to_knots(ms: f64) -> f64 {
    ms * KNOTS_PER_MS
}

// Per-field defaults for missing, null or non-numeric values
fn default_wind_speed() -> f64 {
    0.0
}

fn default_wind_bearing() -> f64 {
    0.0
}

fn default_temperature() -> f64 {
    15.0
}

fn default_uv_index() -> f64 {
    0.0
}

fn default_pressure() -> f64 {
    1013.0
}

fn default_humidity() -> f64 {
    50.0
}

fn default_visibility() -> f64 {
    10_000.0
}

fn default_wave_height() -> f64 {
    0.5
}

fn default_wave_period() -> f64 {
    5.0
}

fn default_wave_bearing() -> f64 {
    180.0
}

fn default_wave_component() -> f64 {
    0.0
}

/// Seasonal sea-surface temperature estimate, clamped to 5..=30 °C
#[must_use]
pub fn seasonal_sea_temperature(latitude: f64, day_of_year: u32) -> f64 {
    let seasonal = ((f64::from(day_of_year) - 172.0) * 2.0 * PI / 365.0).cos();
    let base = 15.0 + (30.0 - latitude.abs()) * 0.5;
    (base + seasonal * 8.0).clamp(5.0, 30.0)
}

/// Instant block, then hourly sample, then default
fn resolve(payload: &RawProviderPayload, name: &str, index: usize, default: fn() -> f64) -> f64 {
    payload
        .instant_value(name)
        .or_else(|| payload.hourly_value(name, index))
        .unwrap_or_else(default)
}

fn resolve_hourly(payload: &RawProviderPayload, name: &str, index: usize, default: fn() -> f64) -> f64 {
    payload.hourly_value(name, index).unwrap_or_else(default)
}

/// Index of the payload sample nearest to a UTC instant, in the payload's own offset
#[must_use]
pub fn aligned_index(payload: &RawProviderPayload, instant: DateTime<Utc>) -> usize {
    let offset = payload.utc_offset();
    nearest_index(payload.timestamps(), provider_local(instant, offset), offset)
}

/// Marine quantities at one index of the marine series
fn apply_marine(conditions: &mut NormalizedConditions, marine: &RawProviderPayload, index: usize, day_of_year: u32) {
    conditions.wave_height = resolve_hourly(marine, metric::WAVE_HEIGHT, index, default_wave_height);
    conditions.wave_period = resolve_hourly(marine, metric::WAVE_PERIOD, index, default_wave_period);
    conditions.wave_bearing = resolve_hourly(marine, metric::WAVE_DIRECTION, index, default_wave_bearing);
    conditions.wind_wave_height = resolve_hourly(marine, metric::WIND_WAVE_HEIGHT, index, default_wave_component);
    conditions.wind_wave_period = resolve_hourly(marine, metric::WIND_WAVE_PERIOD, index, default_wave_component);
    conditions.swell_wave_height = resolve_hourly(marine, metric::SWELL_WAVE_HEIGHT, index, default_wave_component);
    conditions.swell_wave_period = resolve_hourly(marine, metric::SWELL_WAVE_PERIOD, index, default_wave_component);

    let latitude = conditions.location.latitude;
    conditions.water_temperature = marine
        .hourly_value(metric::SEA_SURFACE_TEMPERATURE, index)
        .unwrap_or_else(|| seasonal_sea_temperature(latitude, day_of_year));
}

/// Reconciled "now" snapshot from the standard and marine payloads
#[must_use]
pub fn extract_now(
    standard: &RawProviderPayload,
    marine: &RawProviderPayload,
    location: &Location,
    now: DateTime<Utc>,
) -> NormalizedConditions {
    let std_index = aligned_index(standard, now);
    let marine_index = aligned_index(marine, now);
    debug!(std_index, marine_index, "Aligned provider series to now");

    let wind_speed = resolve(standard, metric::WIND_SPEED, std_index, default_wind_speed);
    let wind_bearing = resolve(standard, metric::WIND_DIRECTION, std_index, default_wind_bearing);

    let mut conditions = NormalizedConditions::new(now, location.clone(), wind_speed, wind_bearing);
    conditions.wind_gust_ms = standard
        .instant_value(metric::WIND_GUSTS)
        .or_else(|| standard.hourly_value(metric::WIND_GUSTS, std_index))
        .unwrap_or(wind_speed);
    conditions.temperature = resolve(standard, metric::TEMPERATURE, std_index, default_temperature);
    conditions.uv_index = resolve(standard, metric::UV_INDEX, std_index, default_uv_index);
    conditions.pressure = resolve(standard, metric::PRESSURE, std_index, default_pressure);
    conditions.humidity = resolve(standard, metric::HUMIDITY, std_index, default_humidity);
    conditions.visibility = resolve(standard, metric::VISIBILITY, std_index, default_visibility);

    apply_marine(&mut conditions, marine, marine_index, now.ordinal());
    conditions
}

/// Snapshot for one hourly sample of the standard series.
///
/// The instant block is ignored; marine values come from the marine sample
/// nearest to the same instant.
#[must_use]
pub fn extract_hour(
    standard: &RawProviderPayload,
    index: usize,
    marine: &RawProviderPayload,
    location: &Location,
) -> Option<(NaiveDateTime, NormalizedConditions)> {
    let offset = standard.utc_offset();
    let raw = standard.timestamps().get(index)?;
    let local = parse_provider_time(raw, offset)?;
    let instant = local_to_utc(local, offset);

    let wind_speed = resolve_hourly(standard, metric::WIND_SPEED, index, default_wind_speed);
    let wind_bearing = resolve_hourly(standard, metric::WIND_DIRECTION, index, default_wind_bearing);

    let mut conditions = NormalizedConditions::new(instant, location.clone(), wind_speed, wind_bearing);
    conditions.wind_gust_ms = standard
        .hourly_value(metric::WIND_GUSTS, index)
        .unwrap_or(wind_speed);
    conditions.temperature = resolve_hourly(standard, metric::TEMPERATURE, index, default_temperature);
    conditions.uv_index = resolve_hourly(standard, metric::UV_INDEX, index, default_uv_index);
    conditions.pressure = resolve_hourly(standard, metric::PRESSURE, index, default_pressure);
    conditions.humidity = resolve_hourly(standard, metric::HUMIDITY, index, default_humidity);
    conditions.visibility = resolve_hourly(standard, metric::VISIBILITY, index, default_visibility);

    let marine_index = aligned_index(marine, instant);
    apply_marine(&mut conditions, marine, marine_index, instant.ordinal());
    Some((local, conditions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn spot() -> Location {
        Location::new("Test Spot".to_string(), 36.0, -5.6, 180.0)
    }

    fn payload(value: serde_json::Value) -> RawProviderPayload {
        serde_json::from_value(value).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 11, 10, 0).unwrap()
    }

    #[test]
    fn test_instant_block_wins_over_hourly() {
        let standard = payload(json!({
            "utc_offset_seconds": 0,
            "hourly": {
                "time": ["2024-06-01T10:00", "2024-06-01T11:00"],
                "wind_speed_10m": [3.0, 4.0],
                "wind_direction_10m": [100, 110],
                "temperature_2m": [18.0, 19.0]
            },
            "current": {"wind_speed_10m": 6.0, "temperature_2m": null}
        }));

        let conditions = extract_now(&standard, &RawProviderPayload::default(), &spot(), now());

        assert_eq!(conditions.wind_speed_ms(), 6.0);
        assert!((conditions.wind_speed_knots() - 6.0 * KNOTS_PER_MS).abs() < 1e-9);
        // null in the instant block falls through to the aligned hourly sample
        assert_eq!(conditions.temperature, 19.0);
        assert_eq!(conditions.wind_bearing, 110.0);
        assert_eq!(conditions.shore_angle_deg(), 70.0);
        // gust falls back to wind speed
        assert_eq!(conditions.wind_gust_ms, 6.0);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let standard = payload(json!({
            "hourly": {
                "time": ["2024-06-01T11:00"],
                "wind_speed_10m": ["n/a"],
                "temperature_2m": [null]
            }
        }));

        let conditions = extract_now(&standard, &RawProviderPayload::default(), &spot(), now());

        assert_eq!(conditions.wind_speed_ms(), 0.0);
        assert_eq!(conditions.wind_bearing, 0.0);
        assert_eq!(conditions.temperature, 15.0);
        assert_eq!(conditions.pressure, 1013.0);
        assert_eq!(conditions.humidity, 50.0);
        assert_eq!(conditions.visibility, 10_000.0);
        assert_eq!(conditions.wave_height, 0.5);
        assert_eq!(conditions.wave_period, 5.0);
        assert_eq!(conditions.wave_bearing, 180.0);
        assert_eq!(conditions.swell_wave_height, 0.0);
        assert_eq!(conditions.water_temperature, seasonal_sea_temperature(36.0, now().ordinal()));
    }

    #[test]
    fn test_marine_uses_its_own_offset() {
        let standard = payload(json!({
            "utc_offset_seconds": 0,
            "hourly": {"time": ["2024-06-01T11:00"], "wind_speed_10m": [5.0], "temperature_2m": [20.0]}
        }));
        // marine series in UTC+2: 13:00 local is 11:00 UTC
        let marine = payload(json!({
            "utc_offset_seconds": 7200,
            "hourly": {
                "time": ["2024-06-01T11:00", "2024-06-01T13:00"],
                "wave_height": [2.5, 0.8],
                "sea_surface_temperature": [19.0, 19.5],
                "wind_wave_height": [0.0, 0.3],
                "swell_wave_height": [0.0, 0.0]
            }
        }));

        let conditions = extract_now(&standard, &marine, &spot(), now());

        assert_eq!(conditions.wave_height, 0.8);
        assert_eq!(conditions.water_temperature, 19.5);
        assert!((conditions.chop_index() - 31.0).abs() < 1e-9);
    }

    #[test]
    fn test_extract_hour_ignores_instant_block() {
        let standard = payload(json!({
            "utc_offset_seconds": 3600,
            "hourly": {
                "time": ["2024-06-01T12:00", "2024-06-01T13:00"],
                "wind_speed_10m": [5.0, 7.0],
                "wind_gusts_10m": [6.0, 9.0],
                "temperature_2m": [20.0, 21.0]
            },
            "current": {"wind_speed_10m": 1.0}
        }));

        let (local, conditions) = extract_hour(&standard, 1, &RawProviderPayload::default(), &spot()).unwrap();

        assert_eq!(local.to_string(), "2024-06-01 13:00:00");
        assert_eq!(conditions.timestamp, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        assert_eq!(conditions.wind_speed_ms(), 7.0);
        assert_eq!(conditions.wind_gust_ms, 9.0);
        assert!(extract_hour(&standard, 5, &RawProviderPayload::default(), &spot()).is_none());
    }

    #[test]
    fn test_seasonal_sea_temperature_bounds() {
        // Midsummer near the tropic peaks and is clamped
        assert_eq!(seasonal_sea_temperature(0.0, 172), 30.0);
        // High latitude midwinter bottoms out
        assert_eq!(seasonal_sea_temperature(80.0, 355), 5.0);
        let mid = seasonal_sea_temperature(40.0, 80);
        assert!((5.0..=30.0).contains(&mid));
    }
}
