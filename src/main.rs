use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

mod handlers;
mod models;
mod services;
mod utils;

use handlers::create_app;
use models::config::AppConfig;
use models::view::Page;
use services::api_client::HttpApiClient;
use services::console::Console;
use utils::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Initialize logging
    let _log_guard = init_logging(&config.logging)?;

    info!("Starting admin console v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        warn!("Configuration invalid, using defaults: {}", e);
    }

    let client = HttpApiClient::new(&config.api).context("building backend client")?;
    info!(
        backend = %config.api.base_url,
        base_path = %config.api.base_path,
        "Backend client ready"
    );

    let console = Console::new(Arc::new(client), config.console.clone());

    // Session starts on the overview page
    console.switch_page(Page::Overview).await;

    let app = create_app(console);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    info!("Admin console listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
