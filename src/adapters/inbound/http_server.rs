//! Standalone HTTP Server
//!
//! Serves the enrichment layer on its own: every request is answered with
//! the geolocation the layer attached to it. Useful for smoke testing a
//! database and as a reference wiring of `GeoIpLayer` into axum.

use crate::adapters::inbound::GeoIpLayer;
use crate::application::{
    candidate_ip, remote_addr, EngineState, EnrichmentEngine, CITY_HEADER, COUNTRY_HEADER,
    REGION_HEADER,
};
use crate::domain::entities::GeoRecord;
use crate::domain::value_objects::UNKNOWN;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// "city", "country" or "unbound"
    pub database: String,
}

/// Echo response: what the next stage would see.
#[derive(Debug, Serialize)]
pub struct GeoResponse {
    pub ip: String,
    #[serde(flatten)]
    pub geo: GeoRecord,
}

/// Build the router with enrichment applied to every route.
pub fn router(layer: GeoIpLayer) -> Router {
    let engine = layer.engine().clone();

    Router::new()
        .route("/health", get(health_handler))
        .fallback(echo_handler)
        .layer(layer)
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// HTTP server exposing the enrichment layer.
pub struct HttpServer {
    listen_addr: String,
    layer: GeoIpLayer,
}

impl HttpServer {
    pub fn new(listen_addr: String, layer: GeoIpLayer) -> Self {
        Self { listen_addr, layer }
    }

    /// Run the server until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = router(self.layer.clone());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("geoip-enrich listening on {}", self.listen_addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("geoip-enrich stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}

// Handler functions

async fn health_handler(State(engine): State<Arc<EnrichmentEngine>>) -> impl IntoResponse {
    let database = match engine.state() {
        EngineState::Bound(kind) => kind.as_str(),
        EngineState::Unbound => "unbound",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}

async fn echo_handler(req: Request) -> impl IntoResponse {
    let headers = req.headers();
    let ip = candidate_ip(headers, &remote_addr(&req));

    Json(GeoResponse {
        ip,
        geo: GeoRecord::new(
            header(headers, COUNTRY_HEADER),
            header(headers, REGION_HEADER),
            header(headers, CITY_HEADER),
        ),
    })
}

fn header(headers: &HeaderMap, name: HeaderName) -> String {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
