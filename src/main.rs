use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

use turfbook::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Missing secret or algorithm is fatal before anything else starts
    let config = AppConfig::from_env()?;

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "turfbook",
        "turfbook starting: RUST_LOG='{}', http_port={}, db_root='{}', algorithm={:?}, token_ttl_minutes={}",
        rust_log, config.http_port, config.db_root, config.algorithm, config.token_ttl_minutes
    );

    turfbook::server::run_with_config(config).await
}
