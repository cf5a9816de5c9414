//! Open-Meteo forecast and marine requests

use super::{ProviderKind, ProviderRequest};
use crate::config::ProvidersConfig;
use crate::models::Location;
use crate::normalize::metric;

const STANDARD_CURRENT: [&str; 5] = [
    metric::TEMPERATURE,
    metric::WIND_SPEED,
    metric::WIND_GUSTS,
    metric::WIND_DIRECTION,
    metric::UV_INDEX,
];

const STANDARD_HOURLY: [&str; 8] = [
    metric::TEMPERATURE,
    metric::HUMIDITY,
    metric::PRESSURE,
    metric::WIND_SPEED,
    metric::WIND_DIRECTION,
    metric::WIND_GUSTS,
    metric::VISIBILITY,
    metric::UV_INDEX,
];

const MARINE_HOURLY: [&str; 10] = [
    metric::WAVE_HEIGHT,
    metric::WAVE_DIRECTION,
    metric::WAVE_PERIOD,
    metric::WIND_WAVE_HEIGHT,
    "wind_wave_direction",
    metric::WIND_WAVE_PERIOD,
    metric::SWELL_WAVE_HEIGHT,
    "swell_wave_direction",
    metric::SWELL_WAVE_PERIOD,
    metric::SEA_SURFACE_TEMPERATURE,
];

const MODEL_HOURLY: [&str; 4] = [
    metric::TEMPERATURE,
    metric::WIND_SPEED,
    metric::WIND_DIRECTION,
    metric::WIND_GUSTS,
];

/// `base/endpoint?k=v&...` with every value percent-encoded
pub(crate) fn build_url(base: &str, endpoint: &str, params: &[(&str, String)]) -> String {
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}/{endpoint}?{query}", base.trim_end_matches('/'))
}

fn location_params(location: &Location, forecast_days: u32) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", location.latitude.to_string()),
        ("longitude", location.longitude.to_string()),
        ("timezone", "auto".to_string()),
        ("forecast_days", forecast_days.to_string()),
    ]
}

/// Atmospheric forecast with a `current` block; wind in m/s
#[must_use]
pub fn standard_request(config: &ProvidersConfig, location: &Location) -> ProviderRequest {
    let mut params = location_params(location, config.forecast_days);
    params.push(("current", STANDARD_CURRENT.join(",")));
    params.push(("hourly", STANDARD_HOURLY.join(",")));
    params.push(("wind_speed_unit", "ms".to_string()));

    ProviderRequest {
        kind: ProviderKind::Standard,
        label: "open-meteo".to_string(),
        url: build_url(&config.forecast_base_url, "forecast", &params),
    }
}

#[must_use]
pub fn marine_request(config: &ProvidersConfig, location: &Location) -> ProviderRequest {
    let mut params = location_params(location, config.forecast_days);
    params.push(("hourly", MARINE_HOURLY.join(",")));

    ProviderRequest {
        kind: ProviderKind::Marine,
        label: "open-meteo-marine".to_string(),
        url: build_url(&config.marine_base_url, "marine", &params),
    }
}

/// Single weather model run, requested in m/s like the standard forecast
#[must_use]
pub fn model_request(config: &ProvidersConfig, location: &Location, model: &str) -> ProviderRequest {
    let mut params = location_params(location, config.forecast_days);
    params.push(("hourly", MODEL_HOURLY.join(",")));
    params.push(("models", model.to_string()));
    params.push(("wind_speed_unit", "ms".to_string()));

    ProviderRequest {
        kind: ProviderKind::ModelRun,
        label: model.to_string(),
        url: build_url(&config.forecast_base_url, "forecast", &params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot() -> Location {
        Location::new("Tarifa".to_string(), 36.01, -5.6, 135.0)
    }

    #[test]
    fn test_standard_request_url() {
        let request = standard_request(&ProvidersConfig::default(), &spot());

        assert_eq!(request.kind, ProviderKind::Standard);
        assert!(request.url.starts_with("https://api.open-meteo.com/v1/forecast?latitude=36.01&longitude=-5.6"));
        assert!(request.url.contains("wind_speed_unit=ms"));
        assert!(request.url.contains("hourly=temperature_2m%2Crelative_humidity_2m"));
        assert!(request.url.contains("forecast_days=3"));
    }

    #[test]
    fn test_model_request_is_metric() {
        let request = model_request(&ProvidersConfig::default(), &spot(), "icon_seamless");

        assert_eq!(request.label, "icon_seamless");
        assert!(request.url.contains("models=icon_seamless"));
        assert!(request.url.contains("wind_speed_unit=ms"));
        assert!(!request.url.contains("wind_speed_unit=kn"));
    }

    #[test]
    fn test_build_url_trims_trailing_slash() {
        let url = build_url("http://127.0.0.1:9000/v1/", "marine", &[("hourly", "a,b".to_string())]);
        assert_eq!(url, "http://127.0.0.1:9000/v1/marine?hourly=a%2Cb");
    }
}
