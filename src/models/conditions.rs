//! The reconciled "now" snapshot of a spot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Location;
use crate::normalize::ms_to_knots;

/// Offset that keeps the chop index finite over a swell-free sea
pub const CHOP_EPSILON: f64 = 0.01;

/// Normalized weather and sea state for one location and instant.
///
/// Wind speed is held in m/s and knots at once; both go through
/// [`NormalizedConditions::set_wind_speed_ms`] so they cannot drift apart.
/// The shore angle and chop index are derived on read, so a later change of
/// bearing or sea state is always reflected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedConditions {
    pub timestamp: DateTime<Utc>,
    pub location: Location,
    wind_speed_ms: f64,
    wind_speed_knots: f64,
    /// Direction the wind blows from, degrees
    pub wind_bearing: f64,
    pub wind_gust_ms: f64,
    /// Air temperature in Celsius
    pub temperature: f64,
    /// Sea-surface temperature in Celsius
    pub water_temperature: f64,
    pub wave_height: f64,
    pub wave_period: f64,
    pub wave_bearing: f64,
    pub wind_wave_height: f64,
    pub wind_wave_period: f64,
    pub swell_wave_height: f64,
    pub swell_wave_period: f64,
    /// Mean sea level pressure in hPa
    pub pressure: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Visibility in meters
    pub visibility: f64,
    pub uv_index: f64,
}

impl NormalizedConditions {
    /// Snapshot with the given wind, every other quantity at its neutral default
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, location: Location, wind_speed_ms: f64, wind_bearing: f64) -> Self {
        Self {
            timestamp,
            location,
            wind_speed_ms,
            wind_speed_knots: ms_to_knots(wind_speed_ms),
            wind_bearing,
            wind_gust_ms: wind_speed_ms,
            temperature: 15.0,
            water_temperature: 15.0,
            wave_height: 0.5,
            wave_period: 5.0,
            wave_bearing: 180.0,
            wind_wave_height: 0.0,
            wind_wave_period: 0.0,
            swell_wave_height: 0.0,
            swell_wave_period: 0.0,
            pressure: 1013.0,
            humidity: 50.0,
            visibility: 10_000.0,
            uv_index: 0.0,
        }
    }

    #[must_use]
    pub fn wind_speed_ms(&self) -> f64 {
        self.wind_speed_ms
    }

    #[must_use]
    pub fn wind_speed_knots(&self) -> f64 {
        self.wind_speed_knots
    }

    /// Replace the sustained wind speed, keeping the knots value in step
    pub fn set_wind_speed_ms(&mut self, wind_speed_ms: f64) {
        self.wind_speed_ms = wind_speed_ms;
        self.wind_speed_knots = ms_to_knots(wind_speed_ms);
    }

    #[must_use]
    pub fn wind_gust_knots(&self) -> f64 {
        ms_to_knots(self.wind_gust_ms)
    }

    /// `|wind bearing - shore bearing| mod 360`
    #[must_use]
    pub fn shore_angle_deg(&self) -> f64 {
        (self.wind_bearing - self.location.shore_bearing).abs() % 360.0
    }

    /// Ratio of wind-driven waves to swell; high values mean short, steep chop
    #[must_use]
    pub fn chop_index(&self) -> f64 {
        (self.wind_wave_height + CHOP_EPSILON) / (self.swell_wave_height + CHOP_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(shore_bearing: f64) -> Location {
        Location::new("Test Spot".to_string(), 36.0, -5.6, shore_bearing)
    }

    #[test]
    fn test_wind_units_stay_consistent() {
        let mut conditions = NormalizedConditions::new(Utc::now(), spot(180.0), 5.0, 90.0);
        assert!((conditions.wind_speed_knots() - 9.72).abs() < 1e-9);

        conditions.set_wind_speed_ms(10.0);
        assert_eq!(conditions.wind_speed_ms(), 10.0);
        assert!((conditions.wind_speed_knots() - 19.44).abs() < 1e-9);
    }

    #[test]
    fn test_shore_angle_follows_bearing() {
        let mut conditions = NormalizedConditions::new(Utc::now(), spot(180.0), 5.0, 90.0);
        assert_eq!(conditions.shore_angle_deg(), 90.0);

        conditions.wind_bearing = 350.0;
        assert_eq!(conditions.shore_angle_deg(), 170.0);
    }

    #[test]
    fn test_chop_index_without_swell() {
        let mut conditions = NormalizedConditions::new(Utc::now(), spot(180.0), 5.0, 90.0);
        conditions.wind_wave_height = 0.3;
        conditions.swell_wave_height = 0.0;
        assert!((conditions.chop_index() - 31.0).abs() < 1e-9);

        conditions.wind_wave_height = 0.0;
        assert!((conditions.chop_index() - 1.0).abs() < 1e-9);
    }
}
