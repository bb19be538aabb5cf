pub mod health;
pub mod repositories;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::canon::CanonicalizeError;
use crate::storage::StoreError;

/// API error types
///
/// Bodies are plain text. Client input problems are 400; anything the store
/// reports is 500 and never mistaken for "not found".
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, message).into_response()
    }
}

impl From<CanonicalizeError> for ApiError {
    fn from(e: CanonicalizeError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(format!("Storage error: {}", e))
    }
}
