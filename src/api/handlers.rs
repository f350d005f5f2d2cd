//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::warn;

use crate::cache::{Lookup, Tier, TieredCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
///
/// The cache needs no lock: each tier serializes its own requests.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<TieredCache>,
}

impl AppState {
    /// Creates a new AppState around an opened cache.
    pub fn new(cache: TieredCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Opens the tiered cache described by the Config.
    pub async fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(TieredCache::open(config).await?))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in both tiers.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let outcome = state.cache.put(req.key.clone(), req.value.into_bytes()).await?;
    if let Some(err) = outcome.disk_error() {
        warn!(key = %req.key, error = %err, "set only reached the memory tier");
    }

    Ok(Json(SetResponse::new(req.key, &outcome)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value by key, reporting which tier served it.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.lookup(&key).await? {
        Lookup::Memory(value) => Ok(Json(GetResponse::new(key, &value, Tier::Memory))),
        Lookup::Disk(value) => Ok(Json(GetResponse::new(key, &value, Tier::Disk))),
        Lookup::Miss => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from both tiers.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.contains(&key).await? {
        return Err(CacheError::NotFound(key));
    }

    let outcome = state.cache.remove(&key).await?;
    Ok(Json(DeleteResponse::new(key, &outcome)))
}

/// Handler for DELETE /clear
///
/// Empties both tiers.
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let outcome = state.cache.clear().await?;
    Ok(Json(ClearResponse::new(&outcome)))
}

/// Handler for GET /stats
///
/// Returns per-tier statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.cache.stats().await?;
    Ok(Json(StatsResponse::new(&stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
