//! # Database Error Types
//!
//! Error types for database operations and the operations boundary.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Core business error OR persistence failure  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller surfaces public_message():                                      │
//! │    business failures  → the specific message, verbatim                  │
//! │    persistence errors → a generic message, details only in the log      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use bookstore_core::{CoreError, RegulationViolation, ValidationError};

// =============================================================================
// Db Error
// =============================================================================

/// Database operation errors.
///
/// These wrap sqlx errors and provide additional context for debugging
/// and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate book name, duplicate
    /// active regulation, ...).
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Store Error
// =============================================================================

/// Error type of the operations boundary (import, checkout, cart,
/// regulation edits, reports).
///
/// Splits failures into the two classes callers must treat differently:
/// business rejections (specific, actionable, nothing was mutated) and
/// persistence failures (generic to the user, fully rolled back).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A business rule or state precondition failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store itself failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl StoreError {
    /// True for business-rule rejections, false for persistence failures.
    pub fn is_business(&self) -> bool {
        matches!(self, StoreError::Core(_))
    }

    /// The message callers may show to a user.
    ///
    /// Business errors are specific (they carry thresholds, remainders
    /// and counts). Persistence failures are reduced to a generic
    /// message; the detail goes to the log only.
    pub fn public_message(&self) -> String {
        match self {
            StoreError::Core(e) => e.to_string(),
            StoreError::Db(DbError::NotFound { entity, id }) => {
                format!("{} not found: {}", entity, id)
            }
            StoreError::Db(DbError::UniqueViolation { field, value }) => {
                format!("duplicate {}: '{}' already exists", field, value)
            }
            StoreError::Db(e) => {
                tracing::error!(error = %e, "storage failure");
                "an unexpected error occurred; the operation was not applied".to_string()
            }
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Db(DbError::from(err))
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Core(CoreError::from(err))
    }
}

impl From<RegulationViolation> for StoreError {
    fn from(err: RegulationViolation) -> Self {
        StoreError::Core(CoreError::from(err))
    }
}

/// Result type for operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
