use anyhow::Context;

use aqi_service::config::Config;
use aqi_service::ingest::waqi::WaqiClient;
use aqi_service::logging::{DEFAULT_LOG_FILTER, init_logging};
use aqi_service::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (optional - won't fail if missing)
    dotenv::dotenv().ok();

    init_logging(DEFAULT_LOG_FILTER);

    let config = Config::load().context("loading configuration")?;
    if config.provider.token == "demo" {
        tracing::warn!("using the WAQI demo token; set WAQI_TOKEN for real lookups");
    }

    let provider = WaqiClient::new(&config.provider).context("building WAQI client")?;
    let state = AppState::new(provider, config.history.clone());
    let app = server::router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!(
        "aqi_service v{} listening on {} (history capacity {})",
        env!("CARGO_PKG_VERSION"),
        addr,
        config.history.capacity
    );

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
