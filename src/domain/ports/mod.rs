mod geo_cache;
mod geo_resolver;

pub use geo_cache::GeoCache;
pub use geo_resolver::{GeoError, GeoResolver};
