use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::search::{InvalidFilter, NumericField};

/// Handler error, rendered as `{"error": "..."}` / 接口错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid {} filter", .0.param())]
    InvalidFilter(NumericField),

    #[error("Internal Server Error")]
    Database(#[from] sqlx::Error),
}

impl From<InvalidFilter> for ApiError {
    fn from(InvalidFilter(field): InvalidFilter) -> Self {
        ApiError::InvalidFilter(field)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(e) => {
                // Detail stays in the log, the client gets the generic message
                tracing::error!("Database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
