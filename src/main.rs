use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use wingcast::{ProviderClient, WingcastConfig, api::AppState, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = WingcastConfig::load()?;
    logging::init(&config.logging)?;

    info!("Starting wingcast v{}", wingcast::VERSION);
    info!(config = ?config.redacted(), "Configuration loaded");
    info!(
        "Spot: {} ({}), models: {}",
        config.location.name,
        config.spot().format_coordinates(),
        config.models.join(", ")
    );

    let client = ProviderClient::new(&config.providers)?;
    web::run(AppState::new(Arc::new(config), client)).await
}
