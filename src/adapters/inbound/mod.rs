mod geoip_layer;
mod http_server;

pub use geoip_layer::{GeoIpLayer, GeoIpService};
pub use http_server::{router, HttpServer};

// Re-export for external use (e.g., integration tests)
#[allow(unused_imports)]
pub use http_server::{GeoResponse, HealthResponse};
