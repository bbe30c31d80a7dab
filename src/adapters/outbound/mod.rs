mod dashmap_geo_cache;
mod maxmind_geo_resolver;

pub use dashmap_geo_cache::DashMapGeoCache;
pub use maxmind_geo_resolver::{
    bind_resolver, open_database, DatabaseError, MaxMindCityResolver, MaxMindCountryResolver,
};
