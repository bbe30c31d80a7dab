//! Enrichment Engine - Main application use case
//!
//! Resolves the client location for a request, consulting the cache before
//! the resolver, and writes the result into request headers. This is the
//! primary interface for the inbound adapter.

use crate::domain::entities::GeoRecord;
use crate::domain::ports::{GeoCache, GeoError, GeoResolver};
use crate::domain::value_objects::{DatabaseKind, LogLevel, UNKNOWN};
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Forwarded client IP, set by the fronting proxy.
pub const REAL_IP_HEADER: HeaderName = HeaderName::from_static("x-real-ip");
pub const COUNTRY_HEADER: HeaderName = HeaderName::from_static("x-geoip2-country");
pub const REGION_HEADER: HeaderName = HeaderName::from_static("x-geoip2-region");
pub const CITY_HEADER: HeaderName = HeaderName::from_static("x-geoip2-city");

/// Resolver binding, fixed when the engine is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Bound(DatabaseKind),
    /// No usable database; every request gets the unknown triple.
    Unbound,
}

/// Enrichment engine - main application use case.
///
/// This engine orchestrates the lookup:
/// 1. Picks the candidate client IP
/// 2. Serves repeated IPs from the cache
/// 3. Falls back to the resolver and caches the outcome, failures included
pub struct EnrichmentEngine {
    resolver: Option<Arc<dyn GeoResolver>>,
    cache: Arc<dyn GeoCache>,
    log_level: LogLevel,
}

impl EnrichmentEngine {
    /// Create a new engine.
    ///
    /// A `None` resolver puts the engine in degraded mode for its lifetime.
    pub fn new(
        resolver: Option<Arc<dyn GeoResolver>>,
        cache: Arc<dyn GeoCache>,
        log_level: LogLevel,
    ) -> Self {
        Self {
            resolver,
            cache,
            log_level,
        }
    }

    pub fn state(&self) -> EngineState {
        match &self.resolver {
            Some(resolver) => EngineState::Bound(resolver.kind()),
            None => EngineState::Unbound,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Decorate a request with geolocation headers.
    ///
    /// Never fails; anything that cannot be resolved shows up as `unknown`.
    /// Returns the record written into the headers.
    pub fn enrich<B>(&self, req: &mut Request<B>) -> Arc<GeoRecord> {
        let remote_addr = remote_addr(req);
        let real_ip = real_ip(req.headers()).unwrap_or_default();

        if self.resolver.is_none() {
            let record = Arc::new(GeoRecord::unknown());
            self.decorate(req.headers_mut(), &record);
            if self.log_level.warn_enabled() {
                tracing::warn!(
                    "unable to lookup remote_addr: {}, x_real_ip: {}",
                    remote_addr,
                    real_ip
                );
            }
            return record;
        }

        let ip = candidate_ip(req.headers(), &remote_addr);
        let record = self.lookup(&ip);
        self.decorate(req.headers_mut(), &record);

        if self.log_level.info_enabled() {
            tracing::info!(
                remote_addr = %remote_addr,
                x_real_ip = %real_ip,
                country = %record.country,
                region = %record.region,
                city = %record.city,
                "geoip enriched request"
            );
        }

        record
    }

    /// Resolve a candidate IP string through the cache.
    ///
    /// The returned record is always normalized. In degraded mode this is the
    /// unknown triple and nothing is cached.
    pub fn lookup(&self, ip: &str) -> Arc<GeoRecord> {
        let Some(resolver) = &self.resolver else {
            return Arc::new(GeoRecord::unknown());
        };

        if let Some(cached) = self.cache.get(ip) {
            tracing::debug!("geoip cache hit for {}", ip);
            return normalize(cached);
        }

        let record = match resolve(resolver.as_ref(), ip) {
            Ok(record) => record.normalized(),
            Err(e) => {
                if self.log_level.warn_enabled() {
                    tracing::warn!("unable to find GeoIP data for `{}', {}", ip, e);
                }
                GeoRecord::unknown()
            }
        };

        let record = Arc::new(record);
        self.cache.set(ip.to_string(), record.clone());
        record
    }

    fn decorate(&self, headers: &mut HeaderMap, record: &GeoRecord) {
        for (name, value) in [
            (COUNTRY_HEADER, &record.country),
            (REGION_HEADER, &record.region),
            (CITY_HEADER, &record.city),
        ] {
            let value = HeaderValue::from_bytes(value.as_bytes()).unwrap_or_else(|_| {
                if self.log_level.warn_enabled() {
                    tracing::warn!("invalid {} header value {:?}", name, value);
                }
                HeaderValue::from_static(UNKNOWN)
            });
            headers.insert(name, value);
        }
    }
}

fn resolve(resolver: &dyn GeoResolver, ip: &str) -> Result<GeoRecord, GeoError> {
    let addr: IpAddr = ip
        .parse()
        .map_err(|_| GeoError::InvalidIp(ip.to_string()))?;
    resolver.resolve(addr)
}

fn normalize(record: Arc<GeoRecord>) -> Arc<GeoRecord> {
    if record.is_normalized() {
        record
    } else {
        Arc::new(GeoRecord::clone(&record).normalized())
    }
}

fn real_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REAL_IP_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .filter(|v| !v.is_empty())
}

/// Peer address as `host:port`, or empty when the server did not record it.
pub fn remote_addr<B>(req: &Request<B>) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default()
}

/// Pick the IP string used for lookup and as cache key.
///
/// A non-empty `X-Real-Ip` wins and is taken at face value. Otherwise the
/// peer address is used with its port removed.
pub fn candidate_ip(headers: &HeaderMap, remote_addr: &str) -> String {
    real_ip(headers).unwrap_or_else(|| strip_port(remote_addr).to_string())
}

/// Remove a trailing port from `host:port` or `[host]:port`.
///
/// Addresses without a port, including bare IPv6, are returned unchanged.
pub fn strip_port(addr: &str) -> &str {
    if let Some(rest) = addr.strip_prefix('[') {
        return match rest.split_once("]:") {
            Some((host, port)) if !port.contains(':') => host,
            _ => addr,
        };
    }

    match addr.split_once(':') {
        Some((host, port)) if !port.contains(':') => host,
        _ => addr,
    }
}
