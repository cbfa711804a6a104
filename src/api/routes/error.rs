//! API error handling.
//!
//! Every failure is rendered as the response envelope with `success: false`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::models::ApiEnvelope;
use crate::services::DiagramServiceError;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized - Invalid or missing authentication";
pub const NOT_FOUND_MESSAGE: &str = "Diagram not found or you don't have access to it";

/// API error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiEnvelope::failure(self.message))).into_response()
    }
}

impl From<DiagramServiceError> for ApiError {
    fn from(err: DiagramServiceError) -> Self {
        match err {
            DiagramServiceError::Validation(message) => ApiError::bad_request(message),
            DiagramServiceError::NotFound => ApiError::not_found(),
            DiagramServiceError::Storage(e) => {
                error!("Storage failure: {}", e);
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}
