//! geoip-enrich Library
//!
//! Request-enrichment stage that tags HTTP requests with the client's
//! country, region and city from an offline MaxMind database.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use adapters::inbound::{GeoIpLayer, GeoIpService, HttpServer};
pub use adapters::outbound::{bind_resolver, open_database, DashMapGeoCache, DatabaseError};
pub use application::{EngineState, EnrichmentEngine};
pub use config::{load_config, Config};
pub use domain::entities::GeoRecord;
pub use domain::ports::{GeoCache, GeoError, GeoResolver};
pub use domain::value_objects::{DatabaseKind, LogLevel, UNKNOWN};
