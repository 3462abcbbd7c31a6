//! Application error types.
//!
//! One typed error model for the whole workspace. Structural introspection
//! failures are surfaced through these variants so callers can distinguish
//! "no data" from "query failed".

use thiserror::Error;

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Application error enumeration.
#[derive(Debug, Error)]
pub enum AppError {
    /// The underlying pool could not supply a live connection.
    #[error("database connection unavailable: {0}")]
    ConnectionUnavailable(String),

    /// The server rejected or failed to execute a query.
    #[error("query execution failed: {0}")]
    QueryExecution(String),

    /// An expected row or object was absent.
    #[error("{0} not found")]
    NotFound(String),

    /// A dialect was paired with a pool of a different database family.
    #[error("dialect mismatch: {0}")]
    DialectMismatch(String),

    /// A caller-supplied identifier failed the allow-list check.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Configuration failed validation.
    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Classifies a sqlx error into the workspace taxonomy.
    ///
    /// Pool- and IO-level failures mean the session is unusable and map to
    /// `ConnectionUnavailable`; everything else is a `QueryExecution`
    /// failure reported by the server.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(e) => AppError::ConnectionUnavailable(e.to_string()),
            sqlx::Error::PoolTimedOut => {
                AppError::ConnectionUnavailable("pool timed out".to_string())
            }
            sqlx::Error::PoolClosed => {
                AppError::ConnectionUnavailable("pool closed".to_string())
            }
            sqlx::Error::Tls(e) => AppError::ConnectionUnavailable(e.to_string()),
            sqlx::Error::RowNotFound => AppError::NotFound("row".to_string()),
            other => AppError::QueryExecution(other.to_string()),
        }
    }

    /// Error code string for logs and structured reporting.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ConnectionUnavailable(_) => "CONNECTION_UNAVAILABLE",
            AppError::QueryExecution(_) => "QUERY_EXECUTION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DialectMismatch(_) => "DIALECT_MISMATCH",
            AppError::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            AppError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}
