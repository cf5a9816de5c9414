use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::{
    WingcastError,
    config::WingcastConfig,
    pipeline::ForecastPipeline,
    report::{CurrentConditionsResponse, DailySummaryResponse, HourlyForecastResponse, MorningReport},
    weather::ProviderClient,
};

/// Services shared by every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WingcastConfig>,
    pub client: ProviderClient,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<WingcastConfig>, client: ProviderClient) -> Self {
        Self { config, client }
    }

    fn pipeline(&self) -> ForecastPipeline {
        ForecastPipeline::new(Arc::clone(&self.config), self.client.clone())
    }
}

/// Error rendered as a JSON body with the status from the domain error
pub struct ApiError(WingcastError);

impl From<WingcastError> for ApiError {
    fn from(e: WingcastError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        error!(status = status.as_u16(), "Request failed: {}", self.0);

        let body = match &self.0 {
            WingcastError::ServiceUnavailable { fallback, .. } => json!({
                "error": self.0.user_message(),
                "details": "Using fallback data",
                "fallback": fallback,
            }),
            other => json!({
                "error": other.user_message(),
                "details": other.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/current-conditions", get(current_conditions))
        .route("/api/hourly-forecast", get(hourly_forecast))
        .route("/api/tomorrow-forecast", get(tomorrow_forecast))
        .route("/api/daily-summary", get(daily_summary))
        .route("/api/inkypi/morning-report", get(morning_report))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        version: crate::VERSION,
    })
}

async fn current_conditions(State(state): State<AppState>) -> ApiResult<CurrentConditionsResponse> {
    let snapshot = state.pipeline().current_conditions(Utc::now()).await?;
    Ok(Json(CurrentConditionsResponse::from(&snapshot)))
}

async fn hourly_forecast(State(state): State<AppState>) -> ApiResult<HourlyForecastResponse> {
    day_forecast(&state, 0).await
}

async fn tomorrow_forecast(State(state): State<AppState>) -> ApiResult<HourlyForecastResponse> {
    day_forecast(&state, 1).await
}

async fn day_forecast(state: &AppState, day_offset: i64) -> ApiResult<HourlyForecastResponse> {
    let outlook = state.pipeline().day_forecast(Utc::now(), day_offset).await?;
    Ok(Json(HourlyForecastResponse::new(&outlook, &state.config.spot())))
}

async fn daily_summary(State(state): State<AppState>) -> ApiResult<DailySummaryResponse> {
    let summary = state.pipeline().daily_summary(Utc::now()).await?;
    Ok(Json(DailySummaryResponse::from(&summary)))
}

async fn morning_report(State(state): State<AppState>) -> ApiResult<MorningReport> {
    let (snapshot, summary) = state.pipeline().morning(Utc::now()).await?;
    Ok(Json(MorningReport::new(&snapshot, &summary)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unavailable_renders_fallback_body() {
        let response = ApiError::from(WingcastError::unavailable("standard payload invalid")).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({
                "error": "Weather service unavailable",
                "details": "Using fallback data",
                "fallback": true
            })
        );
    }

    #[tokio::test]
    async fn test_validation_renders_bad_request() {
        let response = ApiError::from(WingcastError::validation("bad day")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid input: bad day");
    }

    #[tokio::test]
    async fn test_health() {
        let Json(health) = health().await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version, crate::VERSION);
    }
}
