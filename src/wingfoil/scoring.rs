//! Wingfoil suitability scoring
//!
//! Turns a normalized snapshot into a 0-100 score, textual evaluations and a
//! short list of recommendations. The scorer is a pure function of its
//! preferences and the snapshot; missing inputs have already been defaulted
//! and non-finite values are treated as their domain defaults here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::WingfoilPreferences;
use crate::consensus::gust_factor;
use crate::models::NormalizedConditions;

pub const SUITABLE_SCORE: u8 = 60;
pub const MAX_RECOMMENDATIONS: usize = 4;

const SPEED_WEIGHT: f64 = 0.75;
const DIRECTION_WEIGHT: f64 = 0.25;
const WIND_SHARE: f64 = 0.8;
const WAVE_SHARE: f64 = 0.2;

/// Overall verdict category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionCategory {
    Poor,
    Marginal,
    Good,
    Excellent,
}

impl ConditionCategory {
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => ConditionCategory::Excellent,
            70..=84 => ConditionCategory::Good,
            60..=69 => ConditionCategory::Marginal,
            _ => ConditionCategory::Poor,
        }
    }
}

impl fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConditionCategory::Poor => "Poor",
            ConditionCategory::Marginal => "Marginal",
            ConditionCategory::Good => "Good",
            ConditionCategory::Excellent => "Excellent",
        };
        write!(f, "{label}")
    }
}

/// Outcome of scoring one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityVerdict {
    pub suitable: bool,
    pub score: u8,
    pub wind_score: f64,
    pub wave_score: f64,
    pub wind_evaluation: String,
    pub wave_evaluation: String,
    pub overall_conditions: ConditionCategory,
    pub recommendations: Vec<String>,
    /// Reserved; never filled
    pub next_good_window: Option<String>,
}

/// Speed sub-score over the preference bands
#[must_use]
pub fn wind_speed_score(knots: f64, prefs: &WingfoilPreferences) -> (f64, String) {
    let min = prefs.min_wind_knots;
    let opt_min = prefs.optimal_wind_min;
    let opt_max = prefs.optimal_wind_max;
    let max = prefs.max_wind_knots;

    if knots < min {
        (0.0, format!("Too light for foiling ({knots:.1}kts)"))
    } else if knots > max {
        (15.0, format!("Too strong for safe foiling ({knots:.1}kts)"))
    } else if (opt_min..=opt_max).contains(&knots) {
        (100.0, format!("Perfect foiling wind ({knots:.1}kts)"))
    } else if knots < opt_min {
        let span = opt_min - min;
        let progress = if span > 0.0 { (knots - min) / span } else { 0.0 };
        (60.0 + progress * 30.0, format!("Light but foilable ({knots:.1}kts)"))
    } else {
        let span = max - opt_max;
        let progress = if span > 0.0 { (knots - opt_max) / span } else { 1.0 };
        (100.0 - progress * 70.0, format!("Strong wind, small wing needed ({knots:.1}kts)"))
    }
}

/// Fold any bearing difference into [0, 180]
#[must_use]
pub fn fold_angle(angle: f64) -> f64 {
    let angle = angle.rem_euclid(360.0);
    if angle > 180.0 { 360.0 - angle } else { angle }
}

/// Direction sub-score from the shore angle
#[must_use]
pub fn direction_score(shore_angle: f64) -> (f64, &'static str) {
    match fold_angle(shore_angle) {
        a if (60.0..=120.0).contains(&a) => (100.0, "cross-shore (ideal)"),
        a if (30.0..60.0).contains(&a) => (90.0, "cross-offshore (excellent)"),
        a if a > 120.0 && a <= 150.0 => (85.0, "cross-onshore (good)"),
        a if a < 30.0 => (75.0, "offshore (manageable)"),
        _ => (50.0, "onshore (challenging)"),
    }
}

/// Points taken off the wind score for gustiness
#[must_use]
pub fn gust_penalty(factor: f64) -> (f64, &'static str) {
    match factor {
        f if f <= 1.10 => (0.0, "steady"),
        f if f <= 1.25 => (10.0, "moderately gusty"),
        f if f <= 1.40 => (20.0, "gusty"),
        f if f <= 1.60 => (30.0, "very gusty"),
        _ => (40.0, "extremely gusty"),
    }
}

/// Wave sub-score from height and period
#[must_use]
pub fn wave_score(height: f64, period: f64, max_wave_height: f64) -> (f64, String) {
    let (mut score, mut evaluation) = if height > max_wave_height {
        (30.0, format!("Large waves ({height:.1}m) - advanced only"))
    } else if height < 0.2 {
        (100.0, format!("Flat water ({height:.1}m) - ideal for foiling"))
    } else if height <= 0.5 {
        (95.0, format!("Small chop ({height:.1}m) - excellent"))
    } else if height <= 1.0 {
        (85.0, format!("Moderate waves ({height:.1}m) - good"))
    } else if height <= 1.5 {
        (70.0, format!("Larger waves ({height:.1}m) - manageable"))
    } else {
        (50.0, format!("Big waves ({height:.1}m) - challenging"))
    };

    if period > 8.0 {
        score = f64::min(100.0, score + 10.0);
        evaluation.push_str(" (clean)");
    } else if period < 4.0 {
        score = f64::max(20.0, score - 15.0);
        evaluation.push_str(" (choppy)");
    }

    (score, evaluation)
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

/// Scores snapshots against one set of rider preferences
#[derive(Debug, Clone, Copy)]
pub struct SuitabilityScorer {
    prefs: WingfoilPreferences,
}

impl SuitabilityScorer {
    #[must_use]
    pub fn new(prefs: WingfoilPreferences) -> Self {
        Self { prefs }
    }

    #[must_use]
    pub fn preferences(&self) -> &WingfoilPreferences {
        &self.prefs
    }

    /// Wind score with direction and gust penalty applied, and its evaluation.
    ///
    /// Below the minimum wind the result is 0 whatever the direction.
    #[must_use]
    pub fn wind_score(&self, conditions: &NormalizedConditions) -> (f64, String) {
        let knots = finite_or(conditions.wind_speed_knots(), 0.0);
        let gust_knots = finite_or(conditions.wind_gust_knots(), knots);

        let (speed, mut evaluation) = wind_speed_score(knots, &self.prefs);
        let (direction, direction_label) = direction_score(finite_or(conditions.shore_angle_deg(), 0.0));
        let factor = gust_factor(gust_knots, knots);
        let (penalty, gust_label) = gust_penalty(factor);

        evaluation.push_str(&format!(", {direction_label}, {gust_label} (gust factor {factor:.2})"));

        if knots < self.prefs.min_wind_knots {
            return (0.0, evaluation);
        }

        let blended = speed * SPEED_WEIGHT + direction * DIRECTION_WEIGHT;
        (f64::max(0.0, blended - penalty), evaluation)
    }

    /// Score a snapshot
    #[must_use]
    pub fn evaluate(&self, conditions: &NormalizedConditions) -> SuitabilityVerdict {
        let (wind_score, wind_evaluation) = self.wind_score(conditions);
        let (wave_score, wave_evaluation) = wave_score(
            finite_or(conditions.wave_height, 0.5),
            finite_or(conditions.wave_period, 5.0),
            self.prefs.max_wave_height,
        );

        let overall = (wind_score * WIND_SHARE + wave_score * WAVE_SHARE)
            .round()
            .clamp(0.0, 100.0) as u8;

        SuitabilityVerdict {
            suitable: overall >= SUITABLE_SCORE,
            score: overall,
            wind_score,
            wave_score,
            wind_evaluation,
            wave_evaluation,
            overall_conditions: ConditionCategory::from_score(overall),
            recommendations: self.recommendations(conditions, wind_score, wave_score),
            next_good_window: None,
        }
    }

    /// Priority-ordered advice: wind, waves, temperature, gusts, UV
    fn recommendations(&self, conditions: &NormalizedConditions, wind_score: f64, wave_score: f64) -> Vec<String> {
        let knots = finite_or(conditions.wind_speed_knots(), 0.0);
        let mut recommendations = Vec::new();

        if wind_score < 40.0 {
            recommendations.push("Wind too light for foiling - wait for better conditions");
        } else if wind_score < 60.0 {
            recommendations.push("Light wind - use larger wing and light board for early planing");
        } else if knots > 30.0 {
            recommendations.push("Very strong wind - use smallest wing and consider safety");
        } else if knots > 25.0 {
            recommendations.push("Strong wind - use smaller wing (3-4m) and stable foil");
        } else if knots < 10.0 {
            recommendations.push("Very light wind - large wing (6-7m) and low-end foil needed");
        }

        if wave_score < 50.0 {
            recommendations.push("Rough conditions - choose sheltered spots or consider smaller foil");
        } else if conditions.wave_height > 1.5 {
            recommendations.push("Large waves - use stable foil and stay upwind");
        } else if conditions.wave_height < 0.3 {
            recommendations.push("Flat water - perfect for learning and freestyle");
        }

        if conditions.temperature < 10.0 {
            recommendations.push("Cold conditions - bring 4/3mm wetsuit or drysuit");
        } else if conditions.temperature < 15.0 {
            recommendations.push("Cool conditions - 3/2mm wetsuit recommended");
        } else if conditions.temperature > 25.0 {
            recommendations.push("Warm conditions - perfect for learning, stay hydrated");
        }

        if gust_factor(conditions.wind_gust_knots(), knots) > 1.4 {
            recommendations.push("Gusty conditions - be prepared for power management");
        }

        if conditions.uv_index > 7.0 {
            recommendations.push("High UV - wear sun protection and consider shade breaks");
        }

        recommendations
            .into_iter()
            .take(MAX_RECOMMENDATIONS)
            .map(str::to_string)
            .collect()
    }
}
