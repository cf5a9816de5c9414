//! OpenWeather current-conditions cross-check

use serde::Deserialize;
use serde_json::Value;

use super::open_meteo::build_url;
use super::{ProviderKind, ProviderRequest};
use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::models::payload::numeric;
use crate::models::{InstantBlock, Location, RawProviderPayload};
use crate::normalize::metric;

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    wind: Option<Wind>,
    /// Shift from UTC in seconds
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: Option<Value>,
    gust: Option<Value>,
}

/// Current weather in metric units, so wind arrives in m/s
#[must_use]
pub fn cross_check_request(config: &ProvidersConfig, location: &Location, api_key: &str) -> ProviderRequest {
    let params = [
        ("lat", location.latitude.to_string()),
        ("lon", location.longitude.to_string()),
        ("appid", api_key.to_string()),
        ("units", "metric".to_string()),
    ];

    ProviderRequest {
        kind: ProviderKind::CrossCheck,
        label: "openweather".to_string(),
        url: build_url(&config.openweather_base_url, "weather", &params),
    }
}

/// Map an OpenWeather body onto the common payload shape.
///
/// Only the instant wind and gust are kept; a missing gust takes the speed.
pub fn into_payload(body: Value) -> Result<RawProviderPayload, ProviderError> {
    let current: CurrentWeather =
        serde_json::from_value(body).map_err(|e| ProviderError::malformed(e.to_string()))?;

    let wind = current
        .wind
        .ok_or_else(|| ProviderError::malformed("missing wind"))?;
    let speed = wind
        .speed
        .as_ref()
        .and_then(numeric)
        .ok_or_else(|| ProviderError::malformed("missing wind.speed"))?;
    let gust = wind.gust.as_ref().and_then(numeric).unwrap_or(speed);

    let mut instant = InstantBlock::new();
    instant.insert(metric::WIND_SPEED.to_string(), Value::from(speed));
    instant.insert(metric::WIND_GUSTS.to_string(), Value::from(gust));

    Ok(RawProviderPayload {
        utc_offset_seconds: current.timezone,
        hourly: None,
        current: Some(instant),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_payload_maps_wind() {
        let payload = into_payload(json!({
            "wind": {"speed": 6.2, "deg": 250, "gust": 9.1},
            "timezone": 3600
        }))
        .unwrap();

        assert_eq!(payload.instant_value(metric::WIND_SPEED), Some(6.2));
        assert_eq!(payload.instant_value(metric::WIND_GUSTS), Some(9.1));
        assert_eq!(payload.utc_offset_seconds, Some(3600));
        assert!(payload.validate(ProviderKind::CrossCheck.required_fields()).is_ok());
    }

    #[test]
    fn test_into_payload_gust_defaults_to_speed() {
        let payload = into_payload(json!({"wind": {"speed": 4.0}})).unwrap();
        assert_eq!(payload.instant_value(metric::WIND_GUSTS), Some(4.0));
    }

    #[test]
    fn test_into_payload_requires_speed() {
        assert!(matches!(
            into_payload(json!({"wind": {"deg": 90}})),
            Err(ProviderError::Malformed { .. })
        ));
        assert!(into_payload(json!({"main": {"temp": 20.0}})).is_err());
    }

    #[test]
    fn test_cross_check_request_url() {
        let location = Location::new("Tarifa".to_string(), 36.01, -5.6, 135.0);
        let request = cross_check_request(&ProvidersConfig::default(), &location, "k3y");

        assert_eq!(request.kind, ProviderKind::CrossCheck);
        assert_eq!(
            request.url,
            "https://api.openweathermap.org/data/2.5/weather?lat=36.01&lon=-5.6&appid=k3y&units=metric"
        );
    }
}
