//! API Handlers
//!
//! HTTP request handlers exposing the cache operations.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, ClearResponse, DelayRequest, DeleteResponse, ExistsResponse, GetManyRequest,
    GetManyResponse, GetResponse, HealthResponse, PutRequest, PutResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The cache synchronizes internally, so handlers only share an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<Cache<Value>>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: Cache<Value>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates the cache described by `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: CacheConfig) -> Result<Self> {
        Ok(Self::new(Cache::from_config(config)?))
    }
}

fn check_key(key: &str) -> Result<()> {
    match validate_key(key) {
        Some(msg) => Err(CacheError::InvalidRequest(msg)),
        None => Ok(()),
    }
}

/// Handler for PUT /cache/:key
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>> {
    check_key(&key)?;

    let ttl = req.ttl();
    state.cache.put(key.clone(), req.value, ttl).await;

    Ok(Json(PutResponse::new(key)))
}

/// Handler for GET /cache/:key
///
/// Absent and logically expired keys are both reported as not found.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for POST /mget
pub async fn get_many_handler(
    State(state): State<AppState>,
    Json(req): Json<GetManyRequest>,
) -> Json<GetManyResponse> {
    let values = state.cache.get_many(&req.keys[..]).await;
    Json(GetManyResponse { values })
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(&key).await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /cache/:key/delay
pub async fn delay_delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<DelayRequest>,
) -> Result<Json<DeleteResponse>> {
    state
        .cache
        .delay_delete(&key, std::time::Duration::from_secs(req.ttl))
        .await?;
    Ok(Json(DeleteResponse::delayed(key, req.ttl)))
}

/// Handler for GET /cache/:key/exists
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ExistsResponse> {
    let exists = state.cache.exists(&key).await;
    Json(ExistsResponse { key, exists })
}

/// Handler for DELETE /clear
pub async fn clear_all_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear_all().await;
    Json(ClearResponse::all())
}

/// Handler for DELETE /clear/:prefix
pub async fn clear_prefix_handler(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Json<ClearResponse> {
    let removed = state.cache.clear_prefix(&prefix).await;
    Json(ClearResponse::prefix(&prefix, removed))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    Json(StatsResponse::new(state.cache.name(), &stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
