//! Task store error types.

use thiserror::Error;

/// Driver error type, re-exported for callers that match on it.
pub use sqlx::Error as SqlxError;

/// Errors that can occur during task store operations.
#[derive(Debug, Error)]
pub enum TaskStoreError {
    /// Entity not found.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A referenced row does not exist.
    #[error("{entity_type} does not exist: {id}")]
    MissingReference {
        entity_type: &'static str,
        id: String,
    },

    /// A stored row points at a row that no longer exists.
    #[error("{entity_type} {id} referenced by a stored row is missing")]
    DanglingReference {
        entity_type: &'static str,
        id: String,
    },

    /// The row is still referenced by other rows and cannot be deleted.
    #[error("{entity_type} {id} is still referenced by {referenced_by}")]
    InUse {
        entity_type: &'static str,
        id: String,
        referenced_by: &'static str,
    },

    /// Foreign key constraint violation reported by the database.
    #[error("Foreign key constraint violation: {0}")]
    ForeignKeyViolation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl TaskStoreError {
    /// Creates a not found error.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates a missing reference error.
    pub fn missing_reference(entity_type: &'static str, id: impl ToString) -> Self {
        Self::MissingReference {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates a dangling reference error.
    pub fn dangling_reference(entity_type: &'static str, id: impl ToString) -> Self {
        Self::DanglingReference {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates an in-use error.
    pub fn in_use(entity_type: &'static str, id: impl ToString, referenced_by: &'static str) -> Self {
        Self::InUse {
            entity_type,
            id: id.to_string(),
            referenced_by,
        }
    }
}

impl From<sqlx::Error> for TaskStoreError {
    fn from(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_foreign_key_violation() => {
                Self::ForeignKeyViolation(db_err.message().to_string())
            }
            _ => Self::Database(err),
        }
    }
}

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;
