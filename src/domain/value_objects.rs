//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sentinel written into any geographic field that could not be resolved.
pub const UNKNOWN: &str = "unknown";

/// How long a cached lookup stays valid.
pub const CACHE_EXPIRATION: Duration = Duration::from_secs(5 * 60);

/// How often expired cache entries are physically removed.
pub const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Granularity of a geolocation database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseKind {
    /// Country, subdivision and city data (GeoIP2-City, GeoLite2-City)
    City,
    /// Country data only (GeoIP2-Country, GeoLite2-Country)
    Country,
}

impl DatabaseKind {
    /// Probe a database's declared type, city first.
    ///
    /// # Examples
    /// ```
    /// use geoip_enrich::DatabaseKind;
    ///
    /// assert_eq!(DatabaseKind::probe("GeoLite2-City"), Some(DatabaseKind::City));
    /// assert_eq!(DatabaseKind::probe("GeoIP2-Country"), Some(DatabaseKind::Country));
    /// assert_eq!(DatabaseKind::probe("GeoLite2-ASN"), None);
    /// ```
    pub fn probe(database_type: &str) -> Option<Self> {
        [Self::City, Self::Country]
            .into_iter()
            .find(|kind| database_type.contains(kind.marker()))
    }

    fn marker(&self) -> &'static str {
        match self {
            Self::City => "City",
            Self::Country => "Country",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Country => "country",
        }
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log verbosity for the enrichment stage.
///
/// Levels are cumulative: errors are always emitted, `Warn` adds warnings,
/// `Info` adds per-request tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogLevel {
    #[default]
    Error,
    Warn,
    Info,
}

impl LogLevel {
    /// Parse a level case-insensitively. Anything unrecognized means `Error`.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "INFO" => Self::Info,
            "WARN" => Self::Warn,
            _ => Self::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
        }
    }

    pub fn warn_enabled(&self) -> bool {
        *self >= Self::Warn
    }

    pub fn info_enabled(&self) -> bool {
        *self >= Self::Info
    }

    /// Equivalent `tracing` level for subscriber setup.
    pub fn as_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
        }
    }
}

impl From<String> for LogLevel {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== DatabaseKind Tests =====

    #[test]
    fn test_probe_city_types() {
        for t in ["GeoLite2-City", "GeoIP2-City", "GeoIP2-Enterprise-City"] {
            assert_eq!(DatabaseKind::probe(t), Some(DatabaseKind::City), "{}", t);
        }
    }

    #[test]
    fn test_probe_country_types() {
        for t in ["GeoLite2-Country", "GeoIP2-Country"] {
            assert_eq!(DatabaseKind::probe(t), Some(DatabaseKind::Country), "{}", t);
        }
    }

    #[test]
    fn test_probe_city_wins_over_country() {
        assert_eq!(
            DatabaseKind::probe("Country-And-City"),
            Some(DatabaseKind::City)
        );
    }

    #[test]
    fn test_probe_unsupported() {
        assert_eq!(DatabaseKind::probe("GeoLite2-ASN"), None);
        assert_eq!(DatabaseKind::probe(""), None);
        // markers are case-sensitive like the MaxMind type names
        assert_eq!(DatabaseKind::probe("geolite2-city"), None);
    }

    #[test]
    fn test_database_kind_display() {
        assert_eq!(DatabaseKind::City.to_string(), "city");
        assert_eq!(DatabaseKind::Country.to_string(), "country");
    }

    // ===== LogLevel Tests =====

    #[test]
    fn test_log_level_from_str() {
        let tests = vec![
            ("INFO", LogLevel::Info),
            ("info", LogLevel::Info),
            ("Warn", LogLevel::Warn),
            ("ERROR", LogLevel::Error),
            (" warn ", LogLevel::Warn),
        ];

        for (input, expected) in tests {
            assert_eq!(LogLevel::from_str(input), expected, "{}", input);
        }
    }

    #[test]
    fn test_log_level_unrecognized_falls_back_to_error() {
        assert_eq!(LogLevel::from_str(""), LogLevel::Error);
        assert_eq!(LogLevel::from_str("DEBUG"), LogLevel::Error);
        assert_eq!(LogLevel::default(), LogLevel::Error);
    }

    #[test]
    fn test_log_level_is_cumulative() {
        assert!(!LogLevel::Error.warn_enabled());
        assert!(!LogLevel::Error.info_enabled());

        assert!(LogLevel::Warn.warn_enabled());
        assert!(!LogLevel::Warn.info_enabled());

        assert!(LogLevel::Info.warn_enabled());
        assert!(LogLevel::Info.info_enabled());
    }

    #[test]
    fn test_log_level_tracing_mapping() {
        assert_eq!(LogLevel::Error.as_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Warn.as_tracing_level(), tracing::Level::WARN);
        assert_eq!(LogLevel::Info.as_tracing_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_serde_uses_names() {
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, LogLevel::Warn);

        let level: LogLevel = serde_json::from_str("\"verbose\"").unwrap();
        assert_eq!(level, LogLevel::Error);

        assert_eq!(serde_json::to_string(&LogLevel::Info).unwrap(), "\"INFO\"");
    }

    #[test]
    fn test_cache_constants() {
        assert!(CACHE_PURGE_INTERVAL > CACHE_EXPIRATION);
    }
}
