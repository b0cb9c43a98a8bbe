//! # Storage Errors
//!
//! ```text
//! sqlx::Error ──────┐
//! MigrateError ─────┼──► DbError ──► AppError (apps/api) ──► {"error": ...}
//! CoreError (rule) ─┘
//! ```
//!
//! Variants split into two groups. Client errors (`is_client_error`) come
//! from the caller's input and are reported as-is. Everything else is a
//! storage failure whose text stays in the logs.

use sqlx::error::ErrorKind;
use storefront_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No live row with this id; soft-deleted rows count as missing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate value for {constraint}")]
    UniqueViolation { constraint: String },

    /// SQLite refused a write on a `REFERENCES` clause.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A write names a related row that is missing or soft-deleted, e.g. a
    /// product `categoryId` pointing at a deleted category.
    #[error("Referenced {entity} does not exist: {id}")]
    InvalidReference { entity: String, id: String },

    /// A domain rule refused the operation.
    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn invalid_reference(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::InvalidReference {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True when the caller's input, not the store, caused the failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DbError::InvalidReference { .. }
                | DbError::ForeignKeyViolation { .. }
                | DbError::UniqueViolation { .. }
                | DbError::Rule(_)
        )
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => DbError::UniqueViolation {
                    constraint: db_err
                        .message()
                        .rsplit(": ")
                        .next()
                        .unwrap_or("unknown")
                        .to_string(),
                },
                ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                },
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
