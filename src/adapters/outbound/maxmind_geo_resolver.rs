//! MaxMind GeoIP Resolvers
//!
//! Implements GeoResolver over MaxMind GeoIP2/GeoLite2 databases, in a
//! city-granularity and a country-granularity variant.

use crate::domain::entities::GeoRecord;
use crate::domain::ports::{GeoError, GeoResolver};
use crate::domain::value_objects::{DatabaseKind, LogLevel};
use maxminddb::{MaxMindDBError, Reader};
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::Arc;

/// Why a database could not be bound.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("GeoIP DB `{path}' not found: {source}")]
    NotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("GeoIP DB `{path}' not initialized: {source}")]
    Open {
        path: String,
        #[source]
        source: MaxMindDBError,
    },
    #[error("GeoIP DB `{path}' has unsupported type `{database_type}'")]
    UnsupportedKind { path: String, database_type: String },
}

#[derive(Debug, Deserialize)]
struct IsoCode {
    iso_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Names {
    en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CityName {
    names: Option<Names>,
}

#[derive(Debug, Deserialize)]
struct CityResp {
    country: Option<IsoCode>,
    subdivisions: Option<Vec<IsoCode>>,
    city: Option<CityName>,
}

#[derive(Debug, Deserialize)]
struct CountryResp {
    country: Option<IsoCode>,
}

impl From<CityResp> for GeoRecord {
    fn from(resp: CityResp) -> Self {
        let country = resp.country.and_then(|c| c.iso_code).unwrap_or_default();
        let region = resp
            .subdivisions
            .and_then(|subs| subs.into_iter().next())
            .and_then(|s| s.iso_code)
            .unwrap_or_default();
        let city = resp
            .city
            .and_then(|c| c.names)
            .and_then(|n| n.en)
            .unwrap_or_default();

        GeoRecord::new(country, region, city)
    }
}

impl From<CountryResp> for GeoRecord {
    fn from(resp: CountryResp) -> Self {
        GeoRecord::country_only(resp.country.and_then(|c| c.iso_code).unwrap_or_default())
    }
}

fn lookup_error(ip: IpAddr, err: MaxMindDBError) -> GeoError {
    match err {
        MaxMindDBError::AddressNotFoundError(_) => GeoError::NotFound(ip),
        other => GeoError::Lookup {
            ip,
            reason: other.to_string(),
        },
    }
}

/// Resolver backed by a city-level database.
///
/// Populates country, first subdivision and English city name.
pub struct MaxMindCityResolver {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindCityResolver {
    pub fn new(reader: Arc<Reader<Vec<u8>>>) -> Self {
        Self { reader }
    }
}

impl GeoResolver for MaxMindCityResolver {
    fn resolve(&self, ip: IpAddr) -> Result<GeoRecord, GeoError> {
        let resp: CityResp = self.reader.lookup(ip).map_err(|e| lookup_error(ip, e))?;
        Ok(resp.into())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::City
    }
}

/// Resolver backed by a country-level database.
///
/// Never populates region or city.
pub struct MaxMindCountryResolver {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindCountryResolver {
    pub fn new(reader: Arc<Reader<Vec<u8>>>) -> Self {
        Self { reader }
    }
}

impl GeoResolver for MaxMindCountryResolver {
    fn resolve(&self, ip: IpAddr) -> Result<GeoRecord, GeoError> {
        let resp: CountryResp = self.reader.lookup(ip).map_err(|e| lookup_error(ip, e))?;
        Ok(resp.into())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Country
    }
}

/// Open a database file and bind the resolver matching its declared type.
///
/// Missing files, unreadable databases and unsupported types are all errors;
/// the caller decides how to degrade.
pub fn open_database(path: &str) -> Result<Arc<dyn GeoResolver>, DatabaseError> {
    std::fs::metadata(path).map_err(|source| DatabaseError::NotFound {
        path: path.to_string(),
        source,
    })?;

    let reader = Reader::open_readfile(path).map_err(|source| DatabaseError::Open {
        path: path.to_string(),
        source,
    })?;

    let database_type = reader.metadata.database_type.clone();
    let reader = Arc::new(reader);

    match DatabaseKind::probe(&database_type) {
        Some(DatabaseKind::City) => Ok(Arc::new(MaxMindCityResolver::new(reader))),
        Some(DatabaseKind::Country) => Ok(Arc::new(MaxMindCountryResolver::new(reader))),
        None => Err(DatabaseError::UnsupportedKind {
            path: path.to_string(),
            database_type,
        }),
    }
}

/// Open a database, logging and returning None on any failure.
///
/// A missing file is logged as an error; a file that cannot be used is a
/// warning and only shows up when `log_level` enables warnings.
pub fn bind_resolver(path: &str, log_level: LogLevel) -> Option<Arc<dyn GeoResolver>> {
    match open_database(path) {
        Ok(resolver) => {
            if log_level.info_enabled() {
                tracing::info!("GeoIP DB loaded from {} ({})", path, resolver.kind());
            }
            Some(resolver)
        }
        Err(e @ DatabaseError::NotFound { .. }) => {
            tracing::error!("{}", e);
            None
        }
        Err(e) => {
            if log_level.warn_enabled() {
                tracing::warn!("{}", e);
            }
            None
        }
    }
}
