//! Request pipeline
//!
//! One call fetches every provider concurrently, reconciles the payloads into
//! a single snapshot and scores it. Nothing is shared between calls except
//! the configuration and the pooled HTTP client.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::alignment::provider_local;
use crate::config::WingcastConfig;
use crate::consensus::{ConsensusResult, ModelSample, combine};
use crate::models::{NormalizedConditions, RawProviderPayload};
use crate::normalize::{aligned_index, extract_now, metric};
use crate::weather::{Fetched, PayloadOrigin, ProviderClient, ProviderKind, ProviderRequest, open_meteo, openweather};
use crate::wingfoil::{
    DailySummary, DayOutlook, EquipmentAdvice, EquipmentAdvisor, SuitabilityScorer, SuitabilityVerdict,
    day_outlook, daily_summary,
};
use crate::{Result, WingcastError};

/// Contributor name of the cross-check provider in consensus output
pub const CROSS_CHECK_MODEL: &str = "openweather";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Live,
    Unavailable,
    Disabled,
}

/// Where the data behind a response came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSources {
    pub standard: PayloadOrigin,
    pub marine: PayloadOrigin,
    pub cross_check: SourceStatus,
    pub models_used: Vec<String>,
    pub models_failed: Vec<String>,
}

/// Reconciled, scored "now"
#[derive(Debug, Clone)]
pub struct CurrentSnapshot {
    /// Provider-local wall time of the snapshot
    pub local_time: NaiveDateTime,
    pub conditions: NormalizedConditions,
    pub verdict: SuitabilityVerdict,
    pub advice: EquipmentAdvice,
    pub consensus: ConsensusResult,
    pub per_model: Vec<ModelSample>,
    pub sources: DataSources,
}

#[derive(Debug, Clone)]
struct Primary {
    standard: Fetched,
    marine: Fetched,
}

#[derive(Debug, Clone)]
struct Gathered {
    primary: Primary,
    cross_check: Option<RawProviderPayload>,
    cross_check_status: SourceStatus,
    models: Vec<(String, Fetched)>,
}

#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: Arc<WingcastConfig>,
    client: ProviderClient,
}

impl ForecastPipeline {
    #[must_use]
    pub fn new(config: Arc<WingcastConfig>, client: ProviderClient) -> Self {
        Self { config, client }
    }

    #[must_use]
    pub fn config(&self) -> &WingcastConfig {
        &self.config
    }

    #[must_use]
    pub fn scorer(&self) -> SuitabilityScorer {
        SuitabilityScorer::new(self.config.wingfoil_preferences)
    }

    #[must_use]
    pub fn advisor(&self) -> EquipmentAdvisor {
        EquipmentAdvisor::new(self.config.rider())
    }

    fn spawn_fetch(&self, request: ProviderRequest, max_retries: u32) -> JoinHandle<Fetched> {
        let client = self.client.clone();
        tokio::spawn(async move { client.fetch(&request, max_retries).await })
    }

    fn primary_handles(&self) -> (JoinHandle<Fetched>, JoinHandle<Fetched>) {
        let spot = self.config.spot();
        let providers = &self.config.providers;
        (
            self.spawn_fetch(open_meteo::standard_request(providers, &spot), providers.max_retries),
            self.spawn_fetch(open_meteo::marine_request(providers, &spot), providers.max_retries),
        )
    }

    /// Unwrap a primary fetch task; a dead task or an invalid payload is critical
    fn settle_primary(
        kind: ProviderKind,
        joined: std::result::Result<Fetched, tokio::task::JoinError>,
    ) -> Result<Fetched> {
        let fetched = joined.map_err(|e| {
            error!(kind = %kind, "Critical error fetching weather data: {}", e);
            WingcastError::unavailable(format!("{kind} fetch task failed"))
        })?;

        if let Err(e) = fetched.payload.validate(kind.required_fields()) {
            error!(kind = %kind, "Payload invalid even after fallback: {}", e);
            return Err(WingcastError::unavailable(format!("{kind} payload invalid")));
        }
        Ok(fetched)
    }

    async fn fetch_primary(&self) -> Result<Primary> {
        let (standard, marine) = self.primary_handles();
        let (standard, marine) = tokio::join!(standard, marine);
        Ok(Primary {
            standard: Self::settle_primary(ProviderKind::Standard, standard)?,
            marine: Self::settle_primary(ProviderKind::Marine, marine)?,
        })
    }

    async fn fetch_cross_check(&self) -> (Option<RawProviderPayload>, SourceStatus) {
        let Some(api_key) = self.config.integrations.openweather_api_key.as_deref() else {
            info!("No OpenWeather API key configured, skipping cross-check");
            return (None, SourceStatus::Disabled);
        };

        let request = openweather::cross_check_request(&self.config.providers, &self.config.spot(), api_key);
        match self
            .client
            .fetch(&request, self.config.providers.cross_check_max_retries)
            .await
            .live()
        {
            Some(payload) => (Some(payload), SourceStatus::Live),
            None => {
                warn!("Cross-check provider unavailable, continuing without it");
                (None, SourceStatus::Unavailable)
            }
        }
    }

    /// Model runs with bounded concurrency, returned in configured order
    async fn fetch_models(&self) -> Vec<(String, Fetched)> {
        let spot = self.config.spot();
        let providers = &self.config.providers;
        let retries = providers.model_max_retries;
        let concurrency = providers.max_concurrent_fetches.max(1);

        let requests: Vec<(usize, ProviderRequest)> = self
            .config
            .models
            .iter()
            .map(|model| open_meteo::model_request(providers, &spot, model))
            .enumerate()
            .collect();

        // owned futures only; the handler future has to stay Send
        let client = self.client.clone();
        let fetches = requests.into_iter().map(move |(position, request)| {
            let client = client.clone();
            async move {
                let fetched = client.fetch(&request, retries).await;
                (position, request.label, fetched)
            }
        });

        let mut results: Vec<(usize, String, Fetched)> =
            stream::iter(fetches).buffer_unordered(concurrency).collect().await;

        results.sort_by_key(|(position, _, _)| *position);
        results
            .into_iter()
            .map(|(_, model, fetched)| (model, fetched))
            .collect()
    }

    async fn gather(&self) -> Result<Gathered> {
        let (standard, marine) = self.primary_handles();
        let (standard, marine, (cross_check, cross_check_status), models) =
            tokio::join!(standard, marine, self.fetch_cross_check(), self.fetch_models());

        Ok(Gathered {
            primary: Primary {
                standard: Self::settle_primary(ProviderKind::Standard, standard)?,
                marine: Self::settle_primary(ProviderKind::Marine, marine)?,
            },
            cross_check,
            cross_check_status,
            models,
        })
    }

    fn snapshot(&self, gathered: &Gathered, now: DateTime<Utc>) -> CurrentSnapshot {
        let standard = &gathered.primary.standard.payload;
        let marine = &gathered.primary.marine.payload;

        let mut conditions = extract_now(standard, marine, &self.config.spot(), now);
        let primary_wind = conditions.wind_speed_ms();
        let primary_gust = conditions.wind_gust_ms;

        let mut per_model = Vec::new();
        let mut models_failed = Vec::new();

        for (model, fetched) in &gathered.models {
            if fetched.is_fallback() {
                models_failed.push(model.clone());
                continue;
            }
            let index = aligned_index(&fetched.payload, now);
            per_model.push(ModelSample {
                model: model.clone(),
                wind_speed_ms: fetched
                    .payload
                    .hourly_value(metric::WIND_SPEED, index)
                    .unwrap_or(primary_wind),
                wind_gust_ms: fetched
                    .payload
                    .hourly_value(metric::WIND_GUSTS, index)
                    .unwrap_or(primary_gust),
                weight: self.config.model_weight(model),
            });
        }

        if let Some(cross_check) = &gathered.cross_check {
            let speed = cross_check.instant_value(metric::WIND_SPEED);
            let gust = cross_check.instant_value(metric::WIND_GUSTS).or(speed);

            conditions.set_wind_speed_ms(combine(primary_wind, speed));
            conditions.wind_gust_ms = combine(primary_gust, gust);
            info!(
                "Blended wind: primary {:.1}m/s, cross-check {:.1}m/s, result {:.1}m/s",
                primary_wind,
                speed.unwrap_or(primary_wind),
                conditions.wind_speed_ms()
            );

            if let Some(speed) = speed {
                per_model.push(ModelSample {
                    model: CROSS_CHECK_MODEL.to_string(),
                    wind_speed_ms: speed,
                    wind_gust_ms: gust.unwrap_or(speed),
                    weight: self.config.model_weight(CROSS_CHECK_MODEL),
                });
            }
        }

        let consensus = ConsensusResult::from_samples(&per_model, conditions.wind_speed_ms(), conditions.wind_gust_ms);
        debug!(models = per_model.len(), gust_factor = consensus.gust_factor, "Consensus computed");

        let verdict = self.scorer().evaluate(&conditions);
        let advice = self.advisor().advise(&conditions);

        CurrentSnapshot {
            local_time: provider_local(now, standard.utc_offset()),
            sources: DataSources {
                standard: gathered.primary.standard.origin,
                marine: gathered.primary.marine.origin,
                cross_check: gathered.cross_check_status,
                models_used: per_model.iter().map(|s| s.model.clone()).collect(),
                models_failed,
            },
            conditions,
            verdict,
            advice,
            consensus,
            per_model,
        }
    }

    fn local_date(standard: &RawProviderPayload, now: DateTime<Utc>, day_offset: i64) -> NaiveDate {
        provider_local(now, standard.utc_offset()).date() + TimeDelta::days(day_offset)
    }

    /// Current conditions with consensus, verdict and advice
    #[instrument(skip(self))]
    pub async fn current_conditions(&self, now: DateTime<Utc>) -> Result<CurrentSnapshot> {
        let gathered = self.gather().await?;
        Ok(self.snapshot(&gathered, now))
    }

    /// Scored daylight hours of today (`day_offset` 0) or a later local day
    #[instrument(skip(self))]
    pub async fn day_forecast(&self, now: DateTime<Utc>, day_offset: i64) -> Result<DayOutlook> {
        let horizon = i64::from(self.config.providers.forecast_days);
        if !(0..horizon).contains(&day_offset) {
            return Err(WingcastError::validation(format!(
                "day offset {day_offset} is outside the {horizon}-day forecast horizon"
            )));
        }
        let primary = self.fetch_primary().await?;
        let date = Self::local_date(&primary.standard.payload, now, day_offset);
        let outlook = day_outlook(
            &primary.standard.payload,
            &primary.marine.payload,
            &self.config.spot(),
            date,
            &self.scorer(),
        );
        info!(%date, hours = outlook.hours.len(), "Built hourly outlook");
        Ok(outlook)
    }

    #[instrument(skip(self))]
    pub async fn daily_summary(&self, now: DateTime<Utc>) -> Result<DailySummary> {
        let primary = self.fetch_primary().await?;
        Ok(self.summarize_day(&primary, now))
    }

    fn summarize_day(&self, primary: &Primary, now: DateTime<Utc>) -> DailySummary {
        let date = Self::local_date(&primary.standard.payload, now, 0);
        daily_summary(
            &primary.standard.payload,
            &primary.marine.payload,
            &self.config.spot(),
            date,
            &self.config.wingfoil_preferences,
        )
    }

    /// Current snapshot and today's summary from one round of fetches
    #[instrument(skip(self))]
    pub async fn morning(&self, now: DateTime<Utc>) -> Result<(CurrentSnapshot, DailySummary)> {
        let gathered = self.gather().await?;
        let summary = self.summarize_day(&gathered.primary, now);
        Ok((self.snapshot(&gathered, now), summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::fallback_payload;
    use chrono::TimeZone;
    use serde_json::json;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn live(value: serde_json::Value) -> Fetched {
        Fetched {
            payload: serde_json::from_value(value).unwrap(),
            origin: PayloadOrigin::Live,
            attempts: 1,
        }
    }

    fn pipeline(config: WingcastConfig) -> ForecastPipeline {
        let client = ProviderClient::with_client(reqwest::Client::new(), Duration::from_millis(1));
        ForecastPipeline::new(Arc::new(config), client)
    }

    fn model_run(wind: f64, gust: f64) -> Fetched {
        live(json!({
            "hourly": {"time": ["2024-06-01T12:00"], "wind_speed_10m": [wind], "wind_gusts_10m": [gust]}
        }))
    }

    fn gathered(cross_check: Option<RawProviderPayload>) -> Gathered {
        Gathered {
            primary: Primary {
                standard: live(json!({
                    "utc_offset_seconds": 0,
                    "hourly": {
                        "time": ["2024-06-01T12:00"],
                        "wind_speed_10m": [10.0],
                        "wind_gusts_10m": [12.0],
                        "wind_direction_10m": [90.0],
                        "temperature_2m": [21.0]
                    }
                })),
                marine: live(json!({
                    "hourly": {"time": ["2024-06-01T12:00"], "wave_height": [0.4]}
                })),
            },
            cross_check_status: if cross_check.is_some() { SourceStatus::Live } else { SourceStatus::Disabled },
            cross_check,
            models: vec![
                ("gfs_seamless".to_string(), model_run(10.0, 12.0)),
                ("icon_seamless".to_string(), model_run(12.0, 15.0)),
                (
                    "ecmwf_ifs04".to_string(),
                    Fetched {
                        payload: fallback_payload(ProviderKind::ModelRun, now()),
                        origin: PayloadOrigin::Fallback,
                        attempts: 1,
                    },
                ),
            ],
        }
    }

    #[test]
    fn test_snapshot_skips_fallback_models() {
        let snapshot = pipeline(WingcastConfig::default()).snapshot(&gathered(None), now());

        assert_eq!(snapshot.sources.models_used, vec!["gfs_seamless", "icon_seamless"]);
        assert_eq!(snapshot.sources.models_failed, vec!["ecmwf_ifs04"]);
        assert_eq!(snapshot.sources.cross_check, SourceStatus::Disabled);
        assert_eq!(snapshot.consensus.wind.median, 11.0);
        assert_eq!(snapshot.consensus.wind.spread, 2.0);
        assert_eq!(snapshot.conditions.wind_speed_ms(), 10.0);
    }

    #[test]
    fn test_snapshot_blends_cross_check() {
        let mut config = WingcastConfig::default();
        config.model_weights.insert(CROSS_CHECK_MODEL.to_string(), 2.0);
        let cross_check: RawProviderPayload = serde_json::from_value(json!({
            "current": {"wind_speed_10m": 5.0, "wind_gusts_10m": 7.0}
        }))
        .unwrap();

        let snapshot = pipeline(config).snapshot(&gathered(Some(cross_check)), now());

        // 0.6 * 10 + 0.4 * 5
        assert!((snapshot.conditions.wind_speed_ms() - 8.0).abs() < 1e-9);
        assert!((snapshot.conditions.wind_gust_ms - 10.0).abs() < 1e-9);
        assert_eq!(snapshot.per_model.last().unwrap().model, CROSS_CHECK_MODEL);
        assert_eq!(snapshot.consensus.weights_used[CROSS_CHECK_MODEL], 2.0);
        // knots derived once from the blended m/s value
        assert!((snapshot.conditions.wind_speed_knots() - 8.0 * 1.944).abs() < 1e-9);
    }

    #[test]
    fn test_local_date_uses_provider_offset() {
        let standard: RawProviderPayload = serde_json::from_value(json!({"utc_offset_seconds": -36_000})).unwrap();
        let date = ForecastPipeline::local_date(&standard, now(), 1);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());

        let late = Utc.with_ymd_and_hms(2024, 6, 1, 23, 0, 0).unwrap();
        let standard: RawProviderPayload = serde_json::from_value(json!({"utc_offset_seconds": 7200})).unwrap();
        assert_eq!(
            ForecastPipeline::local_date(&standard, late, 0),
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        );
    }

    #[tokio::test]
    async fn test_day_beyond_horizon_is_rejected() {
        let mut config = WingcastConfig::default();
        config.providers.forecast_days = 1;

        let err = pipeline(config).day_forecast(now(), 1).await.unwrap_err();
        assert!(matches!(err, WingcastError::Validation { .. }));
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("1-day forecast horizon"));

        let err = pipeline(WingcastConfig::default()).day_forecast(now(), -1).await.unwrap_err();
        assert!(matches!(err, WingcastError::Validation { .. }));
    }
}
