//! Spot location and rider profile

use serde::{Deserialize, Serialize};

/// A named spot with the bearing its shoreline faces
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Spot name
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Shore-facing bearing in degrees (0-360, where 0/360 is North)
    pub shore_bearing: f64,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(name: String, latitude: f64, longitude: f64, shore_bearing: f64) -> Self {
        Self {
            name,
            latitude,
            longitude,
            shore_bearing,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Rider skill level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Case-insensitive parse; anything unrecognised is intermediate
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "beginner" | "novice" => Self::Beginner,
            "advanced" => Self::Advanced,
            _ => Self::Intermediate,
        }
    }
}

impl<'de> Deserialize<'de> for SkillLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// Read-only rider input for equipment advice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiderProfile {
    pub weight_kg: f64,
    pub skill: SkillLevel,
}

impl Default for RiderProfile {
    fn default() -> Self {
        Self {
            weight_kg: 80.0,
            skill: SkillLevel::Intermediate,
        }
    }
}
