//! geoip-enrich - standalone enrichment server
//!
//! This is the composition root that wires together all the components.

use geoip_enrich::adapters::inbound::{GeoIpLayer, HttpServer};
use geoip_enrich::config::load_config;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        cfg.log_level.as_tracing_level()
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting geoip-enrich db={} listen={} loglevel={}",
        cfg.db_path,
        cfg.listen_addr,
        cfg.log_level
    );

    // ===== COMPOSITION ROOT =====
    // Database, cache and engine are bound once here and never swapped.
    let layer = GeoIpLayer::from_config(&cfg);
    tracing::info!("geoip engine state: {:?}", layer.engine().state());

    let server = HttpServer::new(cfg.listen_addr.clone(), layer);

    server.run().await
}
