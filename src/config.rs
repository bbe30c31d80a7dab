use crate::domain::value_objects::LogLevel;
use serde::Deserialize;

pub const DEFAULT_DB_PATH: &str = "GeoLite2-Country.mmdb";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "dbPath")]
    pub db_path: String,
    #[serde(rename = "loglevel")]
    pub log_level: LogLevel,
    // Standalone server only
    #[serde(rename = "listenAddr")]
    pub listen_addr: String,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            log_level: LogLevel::default(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            debug: false,
        }
    }
}

impl Config {
    /// Parse plugin-style JSON, e.g. `{"dbPath": "...", "loglevel": "WARN"}`.
    ///
    /// Missing fields keep their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let db_path = std::env::var("GEOIP_DB_PATH")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

    let log_level = std::env::var("GEOIP_LOG_LEVEL")
        .map(|v| LogLevel::from_str(&v))
        .unwrap_or_default();

    let listen_addr = std::env::var("GEOIP_LISTEN_ADDR")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        db_path,
        log_level,
        listen_addr,
        debug,
    })
}
