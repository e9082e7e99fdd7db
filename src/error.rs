//! Error types for the peer cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the peer cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in group (absent, or the loader never populated it)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key was present but past its TTL at read time
    #[error("Key expired: {0}")]
    Expired(String),

    /// No group registered under this name
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// The loader returned an error; its message is passed through untouched
    #[error(transparent)]
    LoaderFailed(anyhow::Error),

    /// A peer could not be reached while propagating a delete
    #[error("Peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: String, reason: String },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP listener could not bind its address
    #[error("Failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// True for errors that mean "no value available" (absent or expired).
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NotFound(_) | CacheError::Expired(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) | CacheError::Expired(_) | CacheError::GroupNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::PeerUnreachable { .. } => StatusCode::BAD_GATEWAY,
            CacheError::LoaderFailed(_) | CacheError::Bind { .. } | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the peer cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_failed_is_verbatim() {
        let err = CacheError::LoaderFailed(anyhow::anyhow!("database offline"));
        assert_eq!(err.to_string(), "database offline");
    }

    #[test]
    fn test_is_miss() {
        assert!(CacheError::NotFound("k".into()).is_miss());
        assert!(CacheError::Expired("k".into()).is_miss());
        assert!(!CacheError::GroupNotFound("g".into()).is_miss());
        assert!(!CacheError::LoaderFailed(anyhow::anyhow!("boom")).is_miss());
    }

    #[test]
    fn test_status_codes() {
        let resp = CacheError::Expired("k".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = CacheError::InvalidRequest("empty key".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = CacheError::LoaderFailed(anyhow::anyhow!("boom")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
