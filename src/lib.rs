//! Wingcast - multi-provider marine forecasts scored for wingfoiling
//!
//! Fetches the same conditions from several weather providers, reconciles
//! them into one snapshot, and turns that snapshot into a suitability verdict
//! and equipment advice for a single configured spot.

pub mod alignment;
pub mod api;
pub mod config;
pub mod consensus;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod weather;
pub mod web;
pub mod wingfoil;

// Re-export core types for public API
pub use config::WingcastConfig;
pub use consensus::{ConsensusResult, ConsensusStats};
pub use error::{ProviderError, WingcastError};
pub use models::{Location, NormalizedConditions, RawProviderPayload, RiderProfile, SkillLevel};
pub use pipeline::{CurrentSnapshot, ForecastPipeline};
pub use weather::{Fetched, ProviderClient, ProviderKind};
pub use wingfoil::{EquipmentAdvice, EquipmentAdvisor, SuitabilityScorer, SuitabilityVerdict};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WingcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
