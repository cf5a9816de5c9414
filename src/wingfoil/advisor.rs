//! Equipment sizing and session advice

use serde::{Deserialize, Serialize};

use crate::consensus::gust_factor;
use crate::models::{NormalizedConditions, RiderProfile, SkillLevel};

pub const MAX_ADVICE_ITEMS: usize = 2;

/// Wind band used for wing sizing, split at 8/12/16/20/25/30 knots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindBand {
    VeryLight,
    Light,
    Moderate,
    Fresh,
    Strong,
    VeryStrong,
    Extreme,
}

impl WindBand {
    #[must_use]
    pub fn from_knots(knots: f64) -> Self {
        match knots {
            k if k < 8.0 => WindBand::VeryLight,
            k if k < 12.0 => WindBand::Light,
            k if k < 16.0 => WindBand::Moderate,
            k if k < 20.0 => WindBand::Fresh,
            k if k < 25.0 => WindBand::Strong,
            k if k < 30.0 => WindBand::VeryStrong,
            _ => WindBand::Extreme,
        }
    }

    /// Wing size for a rider around 80 kg
    #[must_use]
    pub fn wing_size(self) -> &'static str {
        match self {
            WindBand::VeryLight => "7-8m",
            WindBand::Light => "6-7m",
            WindBand::Moderate => "5-6m",
            WindBand::Fresh => "4-5m",
            WindBand::Strong => "3.5-4m",
            WindBand::VeryStrong => "3-3.5m",
            WindBand::Extreme => "2.5-3m",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            WindBand::VeryLight => "very light",
            WindBand::Light => "light",
            WindBand::Moderate => "moderate",
            WindBand::Fresh => "fresh",
            WindBand::Strong => "strong",
            WindBand::VeryStrong => "very strong",
            WindBand::Extreme => "extreme",
        }
    }
}

/// Base wing size for a wind speed in knots
#[must_use]
pub fn base_wing_size(knots: f64) -> &'static str {
    WindBand::from_knots(knots).wing_size()
}

/// Advice block for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentAdvice {
    pub recommended_wing_size: String,
    pub gust_factor: f64,
    pub sizing_notes: Vec<String>,
    pub equipment_advice: Vec<String>,
    pub session_advice: Vec<String>,
    pub safety_advice: Vec<String>,
    pub conditions_summary: String,
}

#[derive(Debug, Clone, Copy)]
pub struct EquipmentAdvisor {
    rider: RiderProfile,
}

impl EquipmentAdvisor {
    #[must_use]
    pub fn new(rider: RiderProfile) -> Self {
        Self { rider }
    }

    /// Base wing size plus weight and skill notes.
    ///
    /// Weight only ever changes the notes, never the size itself.
    #[must_use]
    pub fn recommend_wing_size(&self, knots: f64) -> (String, Vec<String>) {
        let band = WindBand::from_knots(knots);
        let mut notes = Vec::new();

        let weight = self.rider.weight_kg;
        if weight >= 100.0 {
            notes.push("Heavy rider (100kg+): size up 1-1.5m".to_string());
        } else if weight >= 85.0 {
            notes.push("Heavy rider (85kg+): size up 0.5-1m".to_string());
        } else if weight <= 60.0 {
            notes.push("Light rider (60kg-): size down 0.5-1m".to_string());
        } else if weight <= 70.0 {
            notes.push("Light rider (70kg-): size down 0.5m".to_string());
        }

        match self.rider.skill {
            SkillLevel::Beginner => {
                notes.push("Beginner: use larger stable wing, avoid gusty conditions".to_string());
            }
            SkillLevel::Advanced => {
                notes.push("Advanced: can handle smaller wings in marginal conditions".to_string());
            }
            SkillLevel::Intermediate => {}
        }

        if knots < 10.0 {
            notes.push(format!(
                "Light wind ({}): use largest wing and light equipment",
                band.description()
            ));
        } else if knots > 25.0 {
            notes.push(format!(
                "Strong wind ({}): prioritize safety and control",
                band.description()
            ));
        }

        (band.wing_size().to_string(), notes)
    }

    #[must_use]
    pub fn advise(&self, conditions: &NormalizedConditions) -> EquipmentAdvice {
        let knots = conditions.wind_speed_knots();
        let factor = gust_factor(conditions.wind_gust_knots(), knots);
        let (wing_size, sizing_notes) = self.recommend_wing_size(knots);

        let mut equipment = Vec::new();
        if knots < 12.0 {
            equipment.push("Low-wind foil: large front wing (1000-1400cm²)");
        } else if knots > 20.0 {
            equipment.push("High-wind foil: smaller front wing (600-900cm²)");
        } else {
            equipment.push("All-round foil: medium front wing (800-1200cm²)");
        }
        if self.rider.skill == SkillLevel::Beginner {
            equipment.push("Board: 80-120L, stable and wide");
        } else {
            equipment.push("Board: 60-90L based on conditions");
        }

        let mut session = Vec::new();
        if factor > 1.3 {
            session.push("Gusty conditions: practice power management");
        }
        if conditions.wave_height > 1.0 {
            session.push("Waves present: practice wave riding skills");
        }
        if conditions.temperature < 15.0 {
            session.push("Cold water: consider shorter sessions");
        }

        let mut safety = Vec::new();
        if knots > 25.0 {
            safety.push("Strong wind: stay close to shore, use impact vest");
        }
        if conditions.visibility < 5000.0 {
            safety.push("Poor visibility: stay near launch area");
        }
        if conditions.uv_index > 6.0 {
            safety.push("High UV: use sun protection");
        }

        EquipmentAdvice {
            recommended_wing_size: wing_size,
            gust_factor: factor,
            sizing_notes,
            equipment_advice: capped(equipment),
            session_advice: capped(session),
            safety_advice: capped(safety),
            conditions_summary: conditions_summary(conditions),
        }
    }
}

fn capped(items: Vec<&str>) -> Vec<String> {
    items
        .into_iter()
        .take(MAX_ADVICE_ITEMS)
        .map(str::to_string)
        .collect()
}

/// One-line wind, wave and temperature description
#[must_use]
pub fn conditions_summary(conditions: &NormalizedConditions) -> String {
    let knots = conditions.wind_speed_knots();
    let wind = match knots {
        k if k < 12.0 => "Light",
        k if k < 18.0 => "Moderate",
        k if k < 25.0 => "Strong",
        _ => "Very Strong",
    };
    let waves = match conditions.wave_height {
        h if h < 0.3 => "flat",
        h if h < 1.0 => "small waves",
        h if h < 1.5 => "moderate waves",
        _ => "large waves",
    };
    let temperature = match conditions.temperature {
        t if t < 12.0 => "cold",
        t if t < 18.0 => "cool",
        t if t < 24.0 => "mild",
        _ => "warm",
    };
    format!("{wind} wind, {waves}, {temperature} conditions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use crate::normalize::KNOTS_PER_MS;
    use chrono::Utc;
    use rstest::rstest;

    fn conditions(knots: f64) -> NormalizedConditions {
        let location = Location::new("Test Spot".to_string(), 36.0, -5.6, 180.0);
        let mut c = NormalizedConditions::new(Utc::now(), location, knots / KNOTS_PER_MS, 90.0);
        c.temperature = 20.0;
        c
    }

    #[rstest]
    #[case(5.0, "7-8m")]
    #[case(8.0, "6-7m")]
    #[case(12.0, "5-6m")]
    #[case(16.0, "4-5m")]
    #[case(20.0, "3.5-4m")]
    #[case(25.0, "3-3.5m")]
    #[case(30.0, "2.5-3m")]
    fn test_base_wing_size_bands(#[case] knots: f64, #[case] size: &str) {
        assert_eq!(base_wing_size(knots), size);
    }

    #[rstest]
    #[case(110.0, "size up 1-1.5m")]
    #[case(90.0, "size up 0.5-1m")]
    #[case(55.0, "size down 0.5-1m")]
    #[case(68.0, "size down 0.5m")]
    fn test_weight_notes_do_not_change_size(#[case] weight: f64, #[case] note: &str) {
        let advisor = EquipmentAdvisor::new(RiderProfile {
            weight_kg: weight,
            skill: SkillLevel::Intermediate,
        });
        let (size, notes) = advisor.recommend_wing_size(14.0);
        assert_eq!(size, "5-6m");
        assert!(notes[0].contains(note));
    }

    #[test]
    fn test_average_intermediate_has_no_notes_in_mid_wind() {
        let advisor = EquipmentAdvisor::new(RiderProfile::default());
        let (_, notes) = advisor.recommend_wing_size(14.0);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_beginner_board_and_notes() {
        let advisor = EquipmentAdvisor::new(RiderProfile {
            weight_kg: 80.0,
            skill: SkillLevel::Beginner,
        });
        let advice = advisor.advise(&conditions(9.0));

        assert_eq!(advice.recommended_wing_size, "6-7m");
        assert!(advice.sizing_notes[0].starts_with("Beginner"));
        assert!(advice.sizing_notes[1].contains("light"));
        assert_eq!(advice.equipment_advice[1], "Board: 80-120L, stable and wide");
    }

    #[test]
    fn test_calm_wind_reports_steady_gusts() {
        let advisor = EquipmentAdvisor::new(RiderProfile::default());
        let mut c = conditions(0.0);
        c.wind_gust_ms = 2.0 / KNOTS_PER_MS;
        let advice = advisor.advise(&c);

        assert_eq!(advice.gust_factor, 1.0);
        assert!(!advice.session_advice.iter().any(|a| a.starts_with("Gusty")));
    }

    #[test]
    fn test_advice_lists_capped() {
        let advisor = EquipmentAdvisor::new(RiderProfile::default());
        let mut c = conditions(28.0);
        c.wind_gust_ms = 40.0 / KNOTS_PER_MS;
        c.wave_height = 1.8;
        c.temperature = 8.0;
        c.visibility = 2000.0;
        c.uv_index = 8.0;
        let advice = advisor.advise(&c);

        assert_eq!(advice.session_advice.len(), MAX_ADVICE_ITEMS);
        assert_eq!(advice.safety_advice.len(), MAX_ADVICE_ITEMS);
        assert_eq!(advice.safety_advice[0], "Strong wind: stay close to shore, use impact vest");
        assert!(advice.gust_factor > 1.4);
    }

    #[test]
    fn test_conditions_summary() {
        let mut c = conditions(15.0);
        c.wave_height = 0.2;
        c.temperature = 22.0;
        assert_eq!(conditions_summary(&c), "Moderate wind, flat, mild conditions");

        let mut c = conditions(26.0);
        c.wave_height = 1.6;
        c.temperature = 10.0;
        assert_eq!(conditions_summary(&c), "Very Strong wind, large waves, cold conditions");
    }
}
