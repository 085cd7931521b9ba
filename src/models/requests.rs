//! Request DTOs for the cache HTTP API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

/// Maximum accepted key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for PUT /cache/:key
///
/// # Fields
/// - `value`: Any JSON value to store
/// - `ttl`: Optional TTL in seconds; absent or negative means the default
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    pub value: Value,
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl PutRequest {
    /// The TTL to hand to the cache, `None` selecting the default.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
            .and_then(|secs| u64::try_from(secs).ok())
            .map(Duration::from_secs)
    }
}

/// Request body for POST /mget
#[derive(Debug, Clone, Deserialize)]
pub struct GetManyRequest {
    pub keys: Vec<String>,
}

/// Request body for POST /cache/:key/delay
#[derive(Debug, Clone, Deserialize)]
pub struct DelayRequest {
    /// New TTL in seconds, counted from now
    pub ttl: u64,
}

/// Validates a key taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
