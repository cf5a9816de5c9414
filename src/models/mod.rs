//! Data models for wingcast
//!
//! This module contains the core domain models organized by concern:
//! - Location: the spot and the rider using it
//! - Payload: raw provider data before normalization
//! - Conditions: the reconciled "now" snapshot

pub mod conditions;
pub mod location;
pub mod payload;

// Re-export all public types for convenient access
pub use conditions::NormalizedConditions;
pub use location::{Location, RiderProfile, SkillLevel};
pub use payload::{HourlyTable, InstantBlock, RawProviderPayload, RequiredFields};
