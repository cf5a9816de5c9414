use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::api::{self, AppState};

/// Upper bound for one request, covering primary retries and backoff
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

pub async fn run(state: AppState) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let server = &state.config.server;
    let addr = format!("{}:{}", server.host, server.port);

    let app = api::router(state.clone())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app).await.context("Web server failed")
}
