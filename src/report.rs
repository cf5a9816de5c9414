//! JSON views of pipeline results
//!
//! Domain values stay unrounded; rounding to display precision happens only
//! when a view is built.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::consensus::{ConsensusResult, ModelSample};
use crate::models::{Location, NormalizedConditions};
use crate::normalize::ms_to_knots;
use crate::pipeline::{CurrentSnapshot, DataSources};
use crate::wingfoil::{DailySummary, DayOutlook, EquipmentAdvice, ScoredHour, SeriesStats, SuitabilityVerdict};

const MORNING_RECOMMENDATIONS: usize = 3;

/// Round half away from zero to `decimals` places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Serialize)]
pub struct ApiLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Location> for ApiLocation {
    fn from(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WeatherView {
    pub location: ApiLocation,
    pub timestamp: String,
    pub wind_speed_knots: f64,
    pub wind_gust_knots: f64,
    pub wind_direction: f64,
    pub temperature: f64,
    pub water_temperature: f64,
    pub wave_height: f64,
    pub wave_period: f64,
    pub wave_direction: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub visibility: f64,
    pub uv_index: f64,
}

impl From<&NormalizedConditions> for WeatherView {
    fn from(c: &NormalizedConditions) -> Self {
        Self {
            location: ApiLocation::from(&c.location),
            timestamp: c.timestamp.to_rfc3339(),
            wind_speed_knots: round_to(c.wind_speed_knots(), 1),
            wind_gust_knots: round_to(c.wind_gust_knots(), 1),
            wind_direction: round_to(c.wind_bearing, 0),
            temperature: round_to(c.temperature, 1),
            water_temperature: round_to(c.water_temperature, 1),
            wave_height: round_to(c.wave_height, 2),
            wave_period: round_to(c.wave_period, 1),
            wave_direction: round_to(c.wave_bearing, 0),
            pressure: round_to(c.pressure, 1),
            humidity: round_to(c.humidity, 0),
            visibility: round_to(c.visibility, 0),
            uv_index: round_to(c.uv_index, 1),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SportMetricsView {
    pub shore_angle_deg: f64,
    pub shore_direction_deg: f64,
    pub wind_to_shore_angle_deg: f64,
    pub chop_index: f64,
    pub wind_wave_height: f64,
    pub wind_wave_period: f64,
    pub swell_wave_height: f64,
    pub swell_wave_period: f64,
}

impl From<&NormalizedConditions> for SportMetricsView {
    fn from(c: &NormalizedConditions) -> Self {
        let angle = round_to(c.shore_angle_deg(), 0);
        Self {
            shore_angle_deg: angle,
            shore_direction_deg: c.location.shore_bearing,
            wind_to_shore_angle_deg: angle,
            chop_index: round_to(c.chop_index(), 2),
            wind_wave_height: round_to(c.wind_wave_height, 2),
            wind_wave_period: round_to(c.wind_wave_period, 1),
            swell_wave_height: round_to(c.swell_wave_height, 2),
            swell_wave_period: round_to(c.swell_wave_period, 1),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelWindView {
    pub wind_speed_knots: f64,
    pub wind_gust_knots: f64,
}

impl From<&ModelSample> for ModelWindView {
    fn from(sample: &ModelSample) -> Self {
        Self {
            wind_speed_knots: round_to(ms_to_knots(sample.wind_speed_ms), 1),
            wind_gust_knots: round_to(ms_to_knots(sample.wind_gust_ms), 1),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConsensusView {
    pub models_used: Vec<String>,
    pub weights_used: BTreeMap<String, f64>,
    pub median_wind_knots: f64,
    pub median_gust_knots: f64,
    pub weighted_wind_knots: f64,
    pub weighted_gust_knots: f64,
    pub spread_knots: f64,
    pub gust_factor: f64,
}

impl From<&ConsensusResult> for ConsensusView {
    fn from(result: &ConsensusResult) -> Self {
        let knots = |ms: f64| round_to(ms_to_knots(ms), 1);
        Self {
            models_used: result.models_used.clone(),
            weights_used: result.weights_used.clone(),
            median_wind_knots: knots(result.wind.median),
            median_gust_knots: knots(result.gust.median),
            weighted_wind_knots: knots(result.wind.weighted_mean),
            weighted_gust_knots: knots(result.gust.weighted_mean),
            spread_knots: knots(result.wind.spread),
            gust_factor: round_to(result.gust_factor, 2),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MultiModelView {
    pub per_model: BTreeMap<String, ModelWindView>,
    pub consensus: ConsensusView,
}

#[derive(Debug, Serialize)]
pub struct CurrentConditionsResponse {
    pub weather: WeatherView,
    pub wingfoil: SuitabilityVerdict,
    pub wingfoil_advice: EquipmentAdvice,
    pub sport_metrics: SportMetricsView,
    pub multi_model: MultiModelView,
    pub data_sources: DataSources,
}

impl From<&CurrentSnapshot> for CurrentConditionsResponse {
    fn from(snapshot: &CurrentSnapshot) -> Self {
        let mut wingfoil = snapshot.verdict.clone();
        wingfoil.wind_score = round_to(wingfoil.wind_score, 1);
        wingfoil.wave_score = round_to(wingfoil.wave_score, 1);

        let mut wingfoil_advice = snapshot.advice.clone();
        wingfoil_advice.gust_factor = round_to(wingfoil_advice.gust_factor, 2);

        Self {
            weather: WeatherView::from(&snapshot.conditions),
            wingfoil,
            wingfoil_advice,
            sport_metrics: SportMetricsView::from(&snapshot.conditions),
            multi_model: MultiModelView {
                per_model: snapshot
                    .per_model
                    .iter()
                    .map(|s| (s.model.clone(), ModelWindView::from(s)))
                    .collect(),
                consensus: ConsensusView::from(&snapshot.consensus),
            },
            data_sources: snapshot.sources.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HourWind {
    pub speed_knots: f64,
    pub direction: f64,
    pub gust_knots: f64,
}

#[derive(Debug, Serialize)]
pub struct HourWaves {
    pub height_m: f64,
    pub period_s: f64,
}

#[derive(Debug, Serialize)]
pub struct HourConditions {
    pub temperature: f64,
    pub uv_index: f64,
    pub pressure: f64,
}

#[derive(Debug, Serialize)]
pub struct HourWingfoil {
    pub score: u8,
    pub suitable: bool,
    pub overall_conditions: String,
    pub wind_evaluation: String,
    pub wing_size: String,
}

#[derive(Debug, Serialize)]
pub struct HourView {
    pub time: String,
    pub timestamp: String,
    pub wind: HourWind,
    pub waves: HourWaves,
    pub conditions: HourConditions,
    pub wingfoil: HourWingfoil,
}

impl From<&ScoredHour> for HourView {
    fn from(hour: &ScoredHour) -> Self {
        let c = &hour.conditions;
        Self {
            time: hour.local_time.format("%H:%M").to_string(),
            timestamp: hour.timestamp.clone(),
            wind: HourWind {
                speed_knots: round_to(c.wind_speed_knots(), 1),
                direction: round_to(c.wind_bearing, 0),
                gust_knots: round_to(c.wind_gust_knots(), 1),
            },
            waves: HourWaves {
                height_m: round_to(c.wave_height, 2),
                period_s: round_to(c.wave_period, 1),
            },
            conditions: HourConditions {
                temperature: round_to(c.temperature, 1),
                uv_index: round_to(c.uv_index, 1),
                pressure: round_to(c.pressure, 1),
            },
            wingfoil: HourWingfoil {
                score: hour.verdict.score,
                suitable: hour.verdict.suitable,
                overall_conditions: hour.verdict.overall_conditions.to_string(),
                wind_evaluation: hour.verdict.wind_evaluation.clone(),
                wing_size: hour.wing_size.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HourlySummary {
    pub total_hours: usize,
    pub good_hours: usize,
    pub suitable_hours: usize,
}

#[derive(Debug, Serialize)]
pub struct HourlyForecastResponse {
    pub date: String,
    pub location: ApiLocation,
    pub hourly_forecast: Vec<HourView>,
    pub summary: HourlySummary,
}

impl HourlyForecastResponse {
    #[must_use]
    pub fn new(outlook: &DayOutlook, location: &Location) -> Self {
        Self {
            date: outlook.date.format("%Y-%m-%d").to_string(),
            location: ApiLocation::from(location),
            hourly_forecast: outlook.hours.iter().map(HourView::from).collect(),
            summary: HourlySummary {
                total_hours: outlook.hours.len(),
                good_hours: outlook.good_hours(),
                suitable_hours: outlook.suitable_hours(),
            },
        }
    }
}

fn rounded_stats(stats: &SeriesStats) -> SeriesStats {
    SeriesStats {
        min: round_to(stats.min, 2),
        max: round_to(stats.max, 2),
        avg: round_to(stats.avg, 2),
    }
}

#[derive(Debug, Serialize)]
pub struct WindowView {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct DailySummaryResponse {
    pub day: String,
    pub wind_knots: SeriesStats,
    pub gust_knots: SeriesStats,
    pub temperature_c: SeriesStats,
    pub wave_height_m: SeriesStats,
    pub optimal_windows: Vec<WindowView>,
}

impl From<&DailySummary> for DailySummaryResponse {
    fn from(summary: &DailySummary) -> Self {
        Self {
            day: summary.day.format("%Y-%m-%d").to_string(),
            wind_knots: rounded_stats(&summary.wind_knots),
            gust_knots: rounded_stats(&summary.gust_knots),
            temperature_c: rounded_stats(&summary.temperature_c),
            wave_height_m: rounded_stats(&summary.wave_height_m),
            optimal_windows: summary
                .optimal_windows
                .iter()
                .map(|w| WindowView {
                    from: w.from.clone(),
                    to: w.to.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MorningConditions {
    pub wind: String,
    pub waves: String,
    pub air_temp: String,
    pub water_temp: String,
    pub pressure: String,
}

#[derive(Debug, Serialize)]
pub struct MorningAssessment {
    pub suitable: bool,
    pub score: u8,
    pub condition: String,
    pub wind_eval: String,
    pub wave_eval: String,
}

#[derive(Debug, Serialize)]
pub struct MorningAdvice {
    pub recommended_wing_size: String,
    pub gust_factor: f64,
}

/// The day's statistics as carried in the morning report
#[derive(Debug, Serialize)]
pub struct DayPlan {
    pub day: String,
    pub wind: SeriesStats,
    pub gust: SeriesStats,
    pub temp: SeriesStats,
    pub waves: SeriesStats,
    pub optimal_windows: Vec<WindowView>,
}

impl From<DailySummaryResponse> for DayPlan {
    fn from(summary: DailySummaryResponse) -> Self {
        Self {
            day: summary.day,
            wind: summary.wind_knots,
            gust: summary.gust_knots,
            temp: summary.temperature_c,
            waves: summary.wave_height_m,
            optimal_windows: summary.optimal_windows,
        }
    }
}

/// Compact report for e-ink displays
#[derive(Debug, Serialize)]
pub struct MorningReport {
    pub title: String,
    pub location: String,
    pub timestamp: String,
    pub conditions: MorningConditions,
    pub wingfoil_assessment: MorningAssessment,
    pub wingfoil_advice: MorningAdvice,
    pub day_plan: DayPlan,
    pub recommendations: Vec<String>,
    pub summary: String,
}

impl MorningReport {
    #[must_use]
    pub fn new(snapshot: &CurrentSnapshot, day: &DailySummary) -> Self {
        let c = &snapshot.conditions;
        let verdict = &snapshot.verdict;

        Self {
            title: "Morning Wingfoil Report".to_string(),
            location: c.location.name.clone(),
            timestamp: snapshot.local_time.format("%Y-%m-%d %H:%M").to_string(),
            conditions: MorningConditions {
                wind: format!("{:.1} knots @ {:.0}°", c.wind_speed_knots(), c.wind_bearing),
                waves: format!("{:.1}m / {:.1}s", c.wave_height, c.wave_period),
                air_temp: format!("{:.1}°C", c.temperature),
                water_temp: format!("{:.1}°C", c.water_temperature),
                pressure: format!("{:.0} hPa", c.pressure),
            },
            wingfoil_assessment: MorningAssessment {
                suitable: verdict.suitable,
                score: verdict.score,
                condition: verdict.overall_conditions.to_string(),
                wind_eval: verdict.wind_evaluation.clone(),
                wave_eval: verdict.wave_evaluation.clone(),
            },
            wingfoil_advice: MorningAdvice {
                recommended_wing_size: snapshot.advice.recommended_wing_size.clone(),
                gust_factor: round_to(snapshot.advice.gust_factor, 2),
            },
            day_plan: DayPlan::from(DailySummaryResponse::from(day)),
            recommendations: verdict
                .recommendations
                .iter()
                .take(MORNING_RECOMMENDATIONS)
                .cloned()
                .collect(),
            summary: format!(
                "Wingfoil conditions: {} ({}/100)",
                verdict.overall_conditions, verdict.score
            ),
        }
    }
}
