//! API Module
//!
//! HTTP handlers and routing for a cache of JSON values.
//!
//! # Endpoints
//! - `PUT /cache/:key` - Store a value with optional TTL
//! - `GET /cache/:key` - Retrieve a value
//! - `DELETE /cache/:key` - Delete a key
//! - `POST /cache/:key/delay` - Give a live key a new TTL
//! - `GET /cache/:key/exists` - Check whether a key is live
//! - `POST /mget` - Retrieve several values
//! - `DELETE /clear` - Remove every entry
//! - `DELETE /clear/:prefix` - Remove entries by key prefix
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
