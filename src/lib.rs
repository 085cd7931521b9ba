//! Craw Cache - An in-process, size-bounded key/value cache
//!
//! Provides LRU eviction between a high and a low size watermark, TTL
//! expiration with a periodic sweep, and an optional HTTP front-end.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheSize, Lookup};
pub use config::{CacheConfig, ServerConfig};
pub use error::CacheError;
