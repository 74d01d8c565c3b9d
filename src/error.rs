use crate::library::form::ValidationErrors;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error.
    #[error("{0}")]
    NotFound(String),

    /// Form input rejected before a record was built.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A book with the same id is already stored.
    #[error("Duplicate book id: {0}")]
    Duplicate(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image processing error.
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Key-value backend error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) | AppError::Io(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let AppError::Validation(errors) = self {
            tracing::debug!(fields = errors.len(), "Rejected book input");
            return (status, Json(errors)).into_response();
        }

        tracing::error!(error = %self, "Request error");

        (status, self.to_string()).into_response()
    }
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
