//! Raw provider payloads
//!
//! Every provider is mapped onto the same shape: an hourly table of parallel
//! metric series keyed by the Open-Meteo metric name, an optional block of
//! already-current values, and the provider's UTC offset. Metric values stay
//! untyped JSON so that nulls and stray strings survive deserialization and
//! are defaulted at the point of use.

use std::collections::BTreeMap;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

/// Values that are already "now", e.g. Open-Meteo's `current` block
pub type InstantBlock = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProviderPayload {
    #[serde(default)]
    pub utc_offset_seconds: Option<i32>,
    #[serde(default)]
    pub hourly: Option<HourlyTable>,
    #[serde(default)]
    pub current: Option<InstantBlock>,
}

/// Time-indexed table of hourly samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyTable {
    #[serde(default)]
    pub time: Option<Vec<String>>,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, Value>,
}

/// The fields a payload has to expose before normalization can use it
#[derive(Debug, Clone, Copy)]
pub struct RequiredFields {
    pub hourly: &'static [&'static str],
    pub instant: &'static [&'static str],
}

impl RawProviderPayload {
    /// Timestamps of the hourly table, empty when there is none
    #[must_use]
    pub fn timestamps(&self) -> &[String] {
        self.hourly
            .as_ref()
            .and_then(|h| h.time.as_deref())
            .unwrap_or(&[])
    }

    /// One metric series of the hourly table
    #[must_use]
    pub fn series(&self, metric: &str) -> Option<&[Value]> {
        self.hourly
            .as_ref()
            .and_then(|h| h.metrics.get(metric))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Numeric hourly value, `None` for missing, null or non-numeric samples
    #[must_use]
    pub fn hourly_value(&self, metric: &str, index: usize) -> Option<f64> {
        self.series(metric)
            .and_then(|values| values.get(index))
            .and_then(numeric)
    }

    /// Numeric value from the instant block
    #[must_use]
    pub fn instant_value(&self, metric: &str) -> Option<f64> {
        self.current
            .as_ref()
            .and_then(|c| c.get(metric))
            .and_then(numeric)
    }

    /// Provider offset from UTC, UTC when absent or out of range
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_seconds
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Shape validation shared by live and fallback payloads
    pub fn validate(&self, required: RequiredFields) -> Result<(), ProviderError> {
        if !required.hourly.is_empty() {
            let hourly = self
                .hourly
                .as_ref()
                .ok_or_else(|| ProviderError::malformed("missing hourly table"))?;
            let times = hourly
                .time
                .as_ref()
                .ok_or_else(|| ProviderError::malformed("missing hourly.time"))?;

            for metric in required.hourly {
                if self.series(metric).is_none() {
                    return Err(ProviderError::malformed(format!("missing hourly.{metric}")));
                }
            }

            for (metric, values) in &hourly.metrics {
                if let Some(values) = values.as_array() {
                    if values.len() != times.len() {
                        return Err(ProviderError::malformed(format!(
                            "hourly.{metric} has {} samples for {} timestamps",
                            values.len(),
                            times.len()
                        )));
                    }
                }
            }
        }

        for metric in required.instant {
            if self.current.as_ref().and_then(|c| c.get(*metric)).is_none() {
                return Err(ProviderError::malformed(format!("missing current.{metric}")));
            }
        }

        Ok(())
    }
}

/// Lenient numeric coercion: numbers and numeric strings, nothing else
#[must_use]
pub fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STANDARD: RequiredFields = RequiredFields {
        hourly: &["wind_speed_10m", "temperature_2m"],
        instant: &[],
    };

    fn payload(value: Value) -> RawProviderPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_deserialize_open_meteo_shape() {
        let p = payload(json!({
            "latitude": 36.0,
            "utc_offset_seconds": 3600,
            "hourly_units": {"wind_speed_10m": "m/s"},
            "hourly": {
                "time": ["2024-06-01T00:00", "2024-06-01T01:00"],
                "wind_speed_10m": [4.2, null],
                "temperature_2m": [18.0, "19.5"]
            },
            "current": {"wind_speed_10m": 5.1, "interval": 900}
        }));

        assert_eq!(p.timestamps().len(), 2);
        assert_eq!(p.hourly_value("wind_speed_10m", 0), Some(4.2));
        assert_eq!(p.hourly_value("wind_speed_10m", 1), None);
        assert_eq!(p.hourly_value("temperature_2m", 1), Some(19.5));
        assert_eq!(p.hourly_value("temperature_2m", 7), None);
        assert_eq!(p.instant_value("wind_speed_10m"), Some(5.1));
        assert_eq!(p.utc_offset().local_minus_utc(), 3600);
        assert!(p.validate(STANDARD).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_metric() {
        let p = payload(json!({
            "hourly": {"time": ["2024-06-01T00:00"], "wind_speed_10m": [4.2]}
        }));
        let err = p.validate(STANDARD).unwrap_err();
        assert!(err.to_string().contains("temperature_2m"));
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let p = payload(json!({
            "hourly": {
                "time": ["2024-06-01T00:00", "2024-06-01T01:00"],
                "wind_speed_10m": [4.2],
                "temperature_2m": [18.0, 18.5]
            }
        }));
        assert!(matches!(p.validate(STANDARD), Err(ProviderError::Malformed { .. })));
    }

    #[test]
    fn test_validate_instant_fields() {
        let required = RequiredFields {
            hourly: &[],
            instant: &["wind_speed_10m"],
        };
        assert!(RawProviderPayload::default().validate(required).is_err());

        let p = payload(json!({"current": {"wind_speed_10m": 3.0}}));
        assert!(p.validate(required).is_ok());
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(numeric(&json!(2)), Some(2.0));
        assert_eq!(numeric(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(numeric(&json!("calm")), None);
        assert_eq!(numeric(&json!(null)), None);
        assert_eq!(numeric(&json!([1.0])), None);
    }
}
