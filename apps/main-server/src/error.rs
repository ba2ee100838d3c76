//! Server error types.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use entities::ValidationError;
use serde_json::json;
use task_store::TaskStoreError;

/// Machine-readable codes carried in error bodies.
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Message sent in place of the details of a 5xx error.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Malformed or invalid input. Raised before the store is touched.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] TaskStoreError),
}

impl ServerError {
    /// Creates a not found error naming the entity ("Status not found").
    pub fn not_found(entity_type: &str) -> Self {
        Self::NotFound(format!("{entity_type} not found"))
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ServerError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                error_codes::VALIDATION_ERROR,
                msg.clone(),
            ),
            ServerError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg.clone())
            }
            ServerError::Database(err) => match err {
                TaskStoreError::NotFound { entity_type, .. } => (
                    StatusCode::NOT_FOUND,
                    error_codes::NOT_FOUND,
                    format!("{entity_type} not found"),
                ),
                TaskStoreError::MissingReference { .. } | TaskStoreError::ForeignKeyViolation(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    error_codes::VALIDATION_ERROR,
                    err.to_string(),
                ),
                TaskStoreError::InUse { .. } => {
                    (StatusCode::CONFLICT, error_codes::CONFLICT, err.to_string())
                }
                // Details stay in the log; clients get a fixed message.
                TaskStoreError::DanglingReference { .. } | TaskStoreError::Database(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                ),
            },
        }
    }
}

impl From<ValidationError> for ServerError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
