//! Response DTOs for the cache HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{Tier, TierSizes, TierStats, TieredStats, WriteOutcome};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value (lossy UTF-8 rendering of the bytes)
    pub value: String,
    /// Tier that served the read
    pub tier: Tier,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: &[u8], tier: Tier) -> Self {
        Self {
            key: key.into(),
            value: String::from_utf8_lossy(value).into_owned(),
            tier,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Disk tier failure, if the write only reached memory
    pub disk_error: Option<String>,
}

impl SetResponse {
    /// Creates a new SetResponse from the write outcome
    pub fn new(key: impl Into<String>, outcome: &WriteOutcome) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            disk_error: outcome.disk_error().map(|err| err.to_string()),
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
    /// Disk tier failure, if the file could not be removed
    pub disk_error: Option<String>,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse from the write outcome
    pub fn new(key: impl Into<String>, outcome: &WriteOutcome) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
            disk_error: outcome.disk_error().map(|err| err.to_string()),
        }
    }
}

/// Response body for the CLEAR operation (DELETE /clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub disk_error: Option<String>,
}

impl ClearResponse {
    pub fn new(outcome: &WriteOutcome) -> Self {
        Self {
            message: "Cache cleared".to_string(),
            disk_error: outcome.disk_error().map(|err| err.to_string()),
        }
    }
}

/// Statistics of one tier
#[derive(Debug, Clone, Serialize)]
pub struct TierStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<&TierStats> for TierStatsResponse {
    fn from(stats: &TierStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            entries: stats.entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub memory: TierStatsResponse,
    pub disk: TierStatsResponse,
    pub sizes: TierSizes,
}

impl StatsResponse {
    /// Creates a new StatsResponse from both tiers' statistics
    pub fn new(stats: &TieredStats) -> Self {
        Self {
            memory: TierStatsResponse::from(&stats.memory),
            disk: TierStatsResponse::from(&stats.disk),
            sizes: TierSizes::from(stats),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
