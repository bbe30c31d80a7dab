//! GeoIP Resolver Port
//!
//! Defines the interface for resolving IP addresses to geographic locations.

use crate::domain::entities::GeoRecord;
use crate::domain::value_objects::DatabaseKind;
use std::net::IpAddr;

/// Why a single lookup produced no record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeoError {
    #[error("invalid IP address `{0}'")]
    InvalidIp(String),
    #[error("no record for {0}")]
    NotFound(IpAddr),
    #[error("lookup failed for {ip}: {reason}")]
    Lookup { ip: IpAddr, reason: String },
}

/// Resolver for IP address to geographic location.
///
/// This is an outbound port that abstracts the GeoIP database.
/// Implementations must return an error instead of panicking.
pub trait GeoResolver: Send + Sync {
    /// Resolve an IP address to geographic information.
    fn resolve(&self, ip: IpAddr) -> Result<GeoRecord, GeoError>;

    /// Granularity of the backing database.
    fn kind(&self) -> DatabaseKind;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_error_messages() {
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

        assert_eq!(
            GeoError::InvalidIp("bogus".to_string()).to_string(),
            "invalid IP address `bogus'"
        );
        assert_eq!(GeoError::NotFound(ip).to_string(), "no record for 10.0.0.1");
        assert_eq!(
            GeoError::Lookup {
                ip,
                reason: "corrupt".to_string()
            }
            .to_string(),
            "lookup failed for 10.0.0.1: corrupt"
        );
    }
}
