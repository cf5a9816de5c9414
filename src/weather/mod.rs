//! Provider client with bounded retries and deterministic fallback
//!
//! A fetch either yields a validated live payload or, once attempts are
//! exhausted or a non-retryable failure is hit, the fallback payload of the
//! provider's role. Callers decide whether fallback data is usable.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::models::{RawProviderPayload, RequiredFields};
use crate::normalize::metric;

pub mod fallback;
pub mod open_meteo;
pub mod openweather;

pub use fallback::fallback_payload;

const PRIMARY_TIMEOUT: Duration = Duration::from_secs(15);
const SECONDARY_TIMEOUT: Duration = Duration::from_secs(10);

/// Role a provider plays in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Standard,
    Marine,
    CrossCheck,
    ModelRun,
}

impl ProviderKind {
    /// Minimum shape a payload of this role must have
    #[must_use]
    pub fn required_fields(self) -> RequiredFields {
        match self {
            ProviderKind::Standard => RequiredFields {
                hourly: &[metric::WIND_SPEED, metric::TEMPERATURE],
                instant: &[],
            },
            ProviderKind::Marine => RequiredFields {
                hourly: &[metric::WAVE_HEIGHT],
                instant: &[],
            },
            ProviderKind::ModelRun => RequiredFields {
                hourly: &[metric::WIND_SPEED],
                instant: &[],
            },
            ProviderKind::CrossCheck => RequiredFields {
                hourly: &[],
                instant: &[metric::WIND_SPEED],
            },
        }
    }

    /// Per-attempt request timeout
    #[must_use]
    pub fn timeout(self) -> Duration {
        match self {
            ProviderKind::Standard | ProviderKind::Marine => PRIMARY_TIMEOUT,
            ProviderKind::CrossCheck | ProviderKind::ModelRun => SECONDARY_TIMEOUT,
        }
    }

    fn decode(self, body: Value) -> std::result::Result<RawProviderPayload, ProviderError> {
        match self {
            ProviderKind::CrossCheck => openweather::into_payload(body),
            ProviderKind::Standard | ProviderKind::Marine | ProviderKind::ModelRun => {
                serde_json::from_value(body).map_err(|e| ProviderError::malformed(e.to_string()))
            }
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Standard => "standard",
            ProviderKind::Marine => "marine",
            ProviderKind::CrossCheck => "cross_check",
            ProviderKind::ModelRun => "model_run",
        };
        write!(f, "{name}")
    }
}

/// A fully built provider request
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub kind: ProviderKind,
    /// Name used in logs and responses; never contains credentials
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadOrigin {
    Live,
    Fallback,
}

/// Result of a fetch, live or substituted
#[derive(Debug, Clone)]
pub struct Fetched {
    pub payload: RawProviderPayload,
    pub origin: PayloadOrigin,
    pub attempts: u32,
}

impl Fetched {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.origin == PayloadOrigin::Fallback
    }

    /// The live payload, `None` for fallback data
    #[must_use]
    pub fn live(self) -> Option<RawProviderPayload> {
        match self.origin {
            PayloadOrigin::Live => Some(self.payload),
            PayloadOrigin::Fallback => None,
        }
    }
}

/// HTTP client shared by every provider fetch.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    backoff_base: Duration,
}

impl ProviderClient {
    /// Create a provider client from configuration
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("wingcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self::with_client(http, Duration::from_millis(config.backoff_base_ms)))
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, backoff_base: Duration) -> Self {
        Self { http, backoff_base }
    }

    /// Delay before the attempt following `attempt` (0-based)
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2_u32.saturating_pow(attempt))
    }

    /// Fetch with up to `max_retries` extra attempts, then fall back
    #[instrument(skip(self, request), fields(provider = %request.label, kind = %request.kind))]
    pub async fn fetch(&self, request: &ProviderRequest, max_retries: u32) -> Fetched {
        let max_attempts = max_retries + 1;
        let request_start = Instant::now();
        let mut attempts = 0;

        debug!("Starting provider fetch (max attempts: {})", max_attempts);

        while attempts < max_attempts {
            let attempt = attempts;
            attempts += 1;

            match self.attempt(request).await {
                Ok(payload) => {
                    info!(
                        attempt = attempts,
                        "Fetched {} data in {:.3}s",
                        request.kind,
                        request_start.elapsed().as_secs_f64()
                    );
                    return Fetched {
                        payload,
                        origin: PayloadOrigin::Live,
                        attempts,
                    };
                }
                Err(err) => {
                    warn!(attempt = attempts, class = err.class(), "Provider attempt failed: {}", err);

                    if err == ProviderError::Unauthorized {
                        error!("Provider rejected the configured credential; check the API key");
                    }
                    if !err.is_retryable() {
                        break;
                    }
                    if attempts < max_attempts {
                        let delay = self.backoff(attempt);
                        debug!("Retrying in {:.3}s", delay.as_secs_f64());
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        error!(attempts, "Provider unavailable, using fallback data");
        Fetched {
            payload: fallback_payload(request.kind, Utc::now()),
            origin: PayloadOrigin::Fallback,
            attempts,
        }
    }

    async fn attempt(&self, request: &ProviderRequest) -> std::result::Result<RawProviderPayload, ProviderError> {
        let response = self
            .http
            .get(&request.url)
            .timeout(request.kind.timeout())
            .send()
            .await?;

        let status = response.status();
        debug!("HTTP response received: {}", status);

        if status.as_u16() == 401 {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| ProviderError::malformed(e.to_string()))?;

        let payload = request.kind.decode(value)?;
        payload.validate(request.kind.required_fields())?;
        Ok(payload)
    }
}
