//! Configuration Module
//!
//! Cache watermarks and sweep interval, read from a flat JSON document, plus
//! the server settings the binary loads from environment variables.

use std::env;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Size at which a shrink pass stops (800 MiB-equivalent units)
pub const DEFAULT_LOW: usize = 800 * (1 << 20);

/// Size at which a shrink pass is requested (1 GiB-equivalent units)
pub const DEFAULT_HIGH: usize = 1 << 30;

/// Expiry sweep period
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 3600);

/// TTL applied when a caller asks for the default (one year)
pub const DEFAULT_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

/// Cache construction parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Cache name, reported by `Cache::name`
    pub name: String,
    /// Low watermark: shrink evicts until the size is at or below this
    pub low: usize,
    /// High watermark: a put that brings the size to this triggers a shrink
    pub high: usize,
    /// Period of the expiry sweep
    pub interval: Duration,
}

impl CacheConfig {
    /// Creates a config with the given name and default watermarks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
            interval: DEFAULT_INTERVAL,
        }
    }

    // == Apply JSON ==
    /// Overlays fields from a flat JSON object.
    ///
    /// Recognized fields are `name`, `low`, `high` and `interval` (seconds).
    /// Parsing is lenient: input that is not a JSON object is ignored as if
    /// no configuration had been supplied, as are unknown fields and fields
    /// of the wrong type.
    pub fn apply_json(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }

        let doc = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(cache = %self.name, "cache configuration is not a JSON object, using defaults");
                return;
            }
            Err(err) => {
                warn!(cache = %self.name, error = %err, "malformed cache configuration, using defaults");
                return;
            }
        };

        if let Some(name) = doc.get("name").and_then(Value::as_str) {
            self.name = name.to_string();
        }
        if let Some(low) = doc.get("low").and_then(as_size) {
            self.low = low;
        }
        if let Some(high) = doc.get("high").and_then(as_size) {
            self.high = high;
        }
        if let Some(secs) = doc.get("interval").and_then(as_size) {
            self.interval = Duration::from_secs(secs as u64);
        }
    }

    /// Builds a config from a name and an optional JSON document.
    pub fn from_json(name: impl Into<String>, raw: &str) -> Self {
        let mut config = Self::new(name);
        config.apply_json(raw);
        config
    }

    // == Validate ==
    /// Rejects watermarks with `high < low` and a zero sweep interval.
    pub fn validate(&self) -> Result<()> {
        if self.high < self.low {
            return Err(CacheError::InvalidConfig(format!(
                "high watermark {} is below low watermark {}",
                self.high, self.low
            )));
        }
        if self.interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new("default")
    }
}

/// Reads a non-negative JSON number, truncating fractions.
fn as_size(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f as usize)
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port
    pub server_port: u16,
    /// Configuration of the served cache
    pub cache: CacheConfig,
}

impl ServerConfig {
    /// Creates a new ServerConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_NAME` - Cache name (default: "default")
    /// - `CACHE_CONFIG` - JSON document with `name`, `low`, `high`, `interval`
    /// - `CACHE_LOW`, `CACHE_HIGH`, `CACHE_INTERVAL` - per-field overrides
    pub fn from_env() -> Self {
        let name = env::var("CACHE_NAME").unwrap_or_else(|_| "default".to_string());
        let mut cache = CacheConfig::new(name);

        if let Ok(raw) = env::var("CACHE_CONFIG") {
            cache.apply_json(&raw);
        }
        if let Some(low) = parse_env("CACHE_LOW") {
            cache.low = low;
        }
        if let Some(high) = parse_env("CACHE_HIGH") {
            cache.high = high;
        }
        if let Some(secs) = parse_env("CACHE_INTERVAL") {
            cache.interval = Duration::from_secs(secs);
        }

        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(3000),
            cache,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache: CacheConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
