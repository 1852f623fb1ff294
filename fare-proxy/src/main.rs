use std::sync::Arc;

use fare_proxy::config::ProxyConfig;
use fare_proxy::upstream::UpstreamClient;
use fare_proxy::web::{AppState, create_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "fare_proxy=info,tower_http=info";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ProxyConfig::from_env().expect("Invalid configuration");
    info!(
        base_url = %config.base_url,
        date = %config.date_param(),
        encodings = ?config.encodings,
        timeout_secs = config.timeout_secs,
        "loaded configuration"
    );

    let client = UpstreamClient::new(&config).expect("Failed to create upstream client");
    let addr = config.bind_addr;

    let state = AppState::new(config, Arc::new(client)).expect("Invalid configuration");
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    info!("Fare proxy listening on http://{addr}");
    info!("  GET /fare?station=<from>&to=<to>  - Look up a fare");
    info!("  GET /health                       - Health check");

    axum::serve(listener, app).await.expect("Server error");
}
