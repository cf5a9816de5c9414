//! Hour-by-hour outlook and daily summary for a local day

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::advisor::base_wing_size;
use super::scoring::{SuitabilityScorer, SuitabilityVerdict};
use crate::alignment::indices_for_local_date;
use crate::config::WingfoilPreferences;
use crate::models::{Location, NormalizedConditions, RawProviderPayload};
use crate::normalize::{extract_hour, metric};

/// Score an hour must reach to count as good
pub const GOOD_HOUR_SCORE: u8 = 70;

#[derive(Debug, Clone)]
pub struct ScoredHour {
    pub local_time: NaiveDateTime,
    /// Timestamp exactly as the provider sent it
    pub timestamp: String,
    pub conditions: NormalizedConditions,
    pub verdict: SuitabilityVerdict,
    pub wing_size: &'static str,
}

#[derive(Debug, Clone)]
pub struct DayOutlook {
    pub date: NaiveDate,
    pub hours: Vec<ScoredHour>,
}

impl DayOutlook {
    #[must_use]
    pub fn good_hours(&self) -> usize {
        self.hours
            .iter()
            .filter(|h| h.verdict.score >= GOOD_HOUR_SCORE)
            .count()
    }

    #[must_use]
    pub fn suitable_hours(&self) -> usize {
        self.hours.iter().filter(|h| h.verdict.suitable).count()
    }
}

/// Daylight hours of `date` in provider-local time, each scored by `scorer`
#[must_use]
pub fn day_outlook(
    standard: &RawProviderPayload,
    marine: &RawProviderPayload,
    location: &Location,
    date: NaiveDate,
    scorer: &SuitabilityScorer,
) -> DayOutlook {
    let offset_seconds = standard.utc_offset().local_minus_utc();
    let timestamps = standard.timestamps();

    let hours = indices_for_local_date(timestamps, offset_seconds, date, true)
        .into_iter()
        .filter_map(|index| {
            let (local_time, conditions) = extract_hour(standard, index, marine, location)?;
            let verdict = scorer.evaluate(&conditions);
            Some(ScoredHour {
                local_time,
                timestamp: timestamps[index].clone(),
                wing_size: base_wing_size(conditions.wind_speed_knots()),
                conditions,
                verdict,
            })
        })
        .collect();

    DayOutlook { date, hours }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl SeriesStats {
    /// Min, max and mean; all zero for an empty series
    #[must_use]
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            avg: values.iter().sum::<f64>() / values.len() as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimalWindow {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub day: NaiveDate,
    pub wind_knots: SeriesStats,
    pub gust_knots: SeriesStats,
    pub temperature_c: SeriesStats,
    pub wave_height_m: SeriesStats,
    pub optimal_windows: Vec<OptimalWindow>,
}

/// Maximal runs of consecutive values inside `[low, high]`, as inclusive index pairs
#[must_use]
pub fn optimal_runs(values: &[f64], low: f64, high: f64) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, value) in values.iter().enumerate() {
        let inside = (low..=high).contains(value);
        match (inside, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, values.len() - 1));
    }

    runs
}

/// Statistics over every hour of the provider-local `date`.
///
/// Wave samples come from the marine series' own local day; missing wave
/// values are left out rather than defaulted.
#[must_use]
pub fn daily_summary(
    standard: &RawProviderPayload,
    marine: &RawProviderPayload,
    location: &Location,
    date: NaiveDate,
    prefs: &WingfoilPreferences,
) -> DailySummary {
    let timestamps = standard.timestamps();
    let hours: Vec<(String, NormalizedConditions)> =
        indices_for_local_date(timestamps, standard.utc_offset().local_minus_utc(), date, false)
            .into_iter()
            .filter_map(|index| {
                let (_, conditions) = extract_hour(standard, index, marine, location)?;
                Some((timestamps[index].clone(), conditions))
            })
            .collect();

    let wind: Vec<f64> = hours.iter().map(|(_, c)| c.wind_speed_knots()).collect();
    let gust: Vec<f64> = hours.iter().map(|(_, c)| c.wind_gust_knots()).collect();
    let temperature: Vec<f64> = hours.iter().map(|(_, c)| c.temperature).collect();

    let waves: Vec<f64> =
        indices_for_local_date(marine.timestamps(), marine.utc_offset().local_minus_utc(), date, false)
            .into_iter()
            .filter_map(|index| marine.hourly_value(metric::WAVE_HEIGHT, index))
            .collect();

    let optimal_windows = optimal_runs(&wind, prefs.optimal_wind_min, prefs.optimal_wind_max)
        .into_iter()
        .map(|(from, to)| OptimalWindow {
            from: hours[from].0.clone(),
            to: hours[to].0.clone(),
        })
        .collect();

    DailySummary {
        day: date,
        wind_knots: SeriesStats::of(&wind),
        gust_knots: SeriesStats::of(&gust),
        temperature_c: SeriesStats::of(&temperature),
        wave_height_m: SeriesStats::of(&waves),
        optimal_windows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::KNOTS_PER_MS;
    use serde_json::json;

    fn spot() -> Location {
        Location::new("Test Spot".to_string(), 36.0, -5.6, 180.0)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    /// Standard payload whose wind is given in knots for readability
    fn standard(times: &[&str], wind_knots: &[f64]) -> RawProviderPayload {
        let wind_ms: Vec<f64> = wind_knots.iter().map(|k| k / KNOTS_PER_MS).collect();
        serde_json::from_value(json!({
            "utc_offset_seconds": 0,
            "hourly": {
                "time": times,
                "wind_speed_10m": wind_ms,
                "wind_direction_10m": vec![90.0; times.len()],
                "temperature_2m": vec![20.0; times.len()]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_optimal_runs() {
        let values = [5.0, 13.0, 15.0, 9.0, 12.0, 22.0, 25.0, 14.0];
        assert_eq!(optimal_runs(&values, 12.0, 22.0), vec![(1, 2), (4, 5), (7, 7)]);
        assert!(optimal_runs(&[], 12.0, 22.0).is_empty());
        assert_eq!(optimal_runs(&[15.0, 16.0], 12.0, 22.0), vec![(0, 1)]);
    }

    #[test]
    fn test_day_outlook_skips_night_and_counts() {
        let payload = standard(
            &[
                "2024-06-01T03:00",
                "2024-06-01T10:00",
                "2024-06-01T11:00",
                "2024-06-01T12:00",
                "2024-06-01T23:00",
                "2024-06-02T10:00",
            ],
            &[15.0, 15.0, 5.0, 18.0, 15.0, 15.0],
        );
        let scorer = SuitabilityScorer::new(WingfoilPreferences::default());

        let outlook = day_outlook(&payload, &RawProviderPayload::default(), &spot(), day(), &scorer);

        assert_eq!(outlook.hours.len(), 3);
        assert_eq!(outlook.hours[0].timestamp, "2024-06-01T10:00");
        assert_eq!(outlook.hours[1].wing_size, "7-8m");
        assert_eq!(outlook.good_hours(), 2);
        assert_eq!(outlook.suitable_hours(), 2);
    }

    #[test]
    fn test_daily_summary_stats_and_windows() {
        let payload = standard(
            &[
                "2024-06-01T09:00",
                "2024-06-01T10:00",
                "2024-06-01T11:00",
                "2024-06-01T12:00",
                "2024-06-02T09:00",
            ],
            &[10.0, 14.0, 16.0, 8.0, 20.0],
        );
        let marine: RawProviderPayload = serde_json::from_value(json!({
            "hourly": {
                "time": ["2024-06-01T09:00", "2024-06-01T12:00", "2024-06-02T09:00"],
                "wave_height": [0.4, null, 3.0]
            }
        }))
        .unwrap();

        let summary = daily_summary(&payload, &marine, &spot(), day(), &WingfoilPreferences::default());

        assert!((summary.wind_knots.min - 8.0).abs() < 1e-9);
        assert!((summary.wind_knots.max - 16.0).abs() < 1e-9);
        assert!((summary.wind_knots.avg - 12.0).abs() < 1e-9);
        assert_eq!(summary.temperature_c.avg, 20.0);
        assert_eq!(summary.wave_height_m.max, 0.4);
        assert_eq!(
            summary.optimal_windows,
            vec![OptimalWindow {
                from: "2024-06-01T10:00".to_string(),
                to: "2024-06-01T11:00".to_string(),
            }]
        );
    }

    #[test]
    fn test_daily_summary_empty_day() {
        let payload = standard(&["2024-06-03T09:00"], &[10.0]);
        let summary = daily_summary(
            &payload,
            &RawProviderPayload::default(),
            &spot(),
            day(),
            &WingfoilPreferences::default(),
        );
        assert_eq!(summary.wind_knots, SeriesStats::default());
        assert!(summary.optimal_windows.is_empty());
    }
}
