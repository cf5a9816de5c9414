//! Wingfoil domain logic: suitability scoring, equipment advice and day outlooks

pub mod advisor;
pub mod forecast;
pub mod scoring;

pub use advisor::{EquipmentAdvice, EquipmentAdvisor, WindBand, base_wing_size};
pub use forecast::{DailySummary, DayOutlook, OptimalWindow, ScoredHour, SeriesStats, day_outlook, daily_summary};
pub use scoring::{ConditionCategory, SuitabilityScorer, SuitabilityVerdict};
