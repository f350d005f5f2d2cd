//! Error types for the tiered cache
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache and its persistence stores.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in any tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid key or value
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cache directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    /// Value could not be serialized
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// File could not be written
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    /// File could not be read or decoded
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// File could not be deleted
    #[error("Failed to delete {path}: {source}")]
    Delete { path: PathBuf, source: io::Error },

    /// Cache directory could not be removed
    #[error("Failed to remove directory {path}: {source}")]
    RemoveDir { path: PathBuf, source: io::Error },

    /// The worker owning a tier has stopped
    #[error("{0} tier worker is unavailable")]
    WorkerUnavailable(&'static str),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::WorkerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let not_found = CacheError::NotFound("k".to_string()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = CacheError::InvalidRequest("bad".to_string()).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let gone = CacheError::WorkerUnavailable("disk").into_response();
        assert_eq!(gone.status(), StatusCode::SERVICE_UNAVAILABLE);

        let io_err = CacheError::Write {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::new(io::ErrorKind::Other, "boom"),
        }
        .into_response();
        assert_eq!(io_err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_io_error_message_includes_path() {
        let err = CacheError::Read {
            path: PathBuf::from("/cache/key1"),
            source: io::Error::new(io::ErrorKind::InvalidData, "bad json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/cache/key1"));
        assert!(msg.contains("bad json"));
    }
}
