//! Error types for the Stagehand API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use stagehand_core::error::EngineError;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The project could not be loaded.
    #[error("project error: {0}")]
    Project(#[from] EngineError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `EngineError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            EngineError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            EngineError::MissingReference { .. } => (StatusCode::NOT_FOUND, "missing_reference"),
            EngineError::NotSuspended => (StatusCode::CONFLICT, "not_suspended"),
            EngineError::UnexpectedResume { .. } => (StatusCode::CONFLICT, "unexpected_resume"),
            EngineError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            EngineError::InvalidOperatorOrType(_) => {
                (StatusCode::BAD_REQUEST, "invalid_operator_or_type")
            }
            EngineError::MediaLoadFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "media_load_failure")
            }
            EngineError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
