//! Error types for the switchboard runner.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::model::ResolutionError;

/// Error types for configuration, registration and lookup.
///
/// Failures inside a dispatched call never surface as this type; the
/// dispatcher turns them into structured responses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read model config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model config {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("Invalid model config: {0}")]
    ConfigSchema(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Model '{0}' not found")]
    ModelNotFound(String),

    #[error("Function '{function}' not found")]
    FunctionNotFound { model: String, function: String },

    #[error("Invalid service configuration: {0}")]
    Service(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::ConfigRead { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "config_read_error"),
            Error::ConfigParse { .. } => (StatusCode::BAD_REQUEST, "config_parse_error"),
            Error::ConfigSchema(_) => (StatusCode::BAD_REQUEST, "config_schema_error"),
            Error::Resolution(_) => (StatusCode::UNPROCESSABLE_ENTITY, "resolution_error"),
            Error::ModelNotFound(_) => (StatusCode::NOT_FOUND, "model_not_found"),
            Error::FunctionNotFound { .. } => (StatusCode::NOT_FOUND, "function_not_found"),
            Error::Service(_) => (StatusCode::INTERNAL_SERVER_ERROR, "service_error"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
