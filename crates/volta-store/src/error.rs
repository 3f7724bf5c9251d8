//! # Store Error Types
//!
//! Error types for document store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error / adapter offline                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ShopError (volta-sync) ← Localized message for the user               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (terminal) ← Serialized for the front end                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Document store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document does not exist (only raised where a document is required).
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// A create-if-absent write hit an existing document.
    ///
    /// ## When This Occurs
    /// - Two seeders racing on the same product id
    /// - Registering a phone number that is already taken
    /// - Order id collision
    #[error("{collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    /// An `Expect` write did not hold; nothing in the commit was applied.
    #[error("{collection}/{id} precondition on {field} failed")]
    PreconditionFailed {
        collection: String,
        id: String,
        field: String,
    },

    /// The backend cannot be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A document is not valid JSON for the requested type.
    #[error("Malformed document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Internal store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn already_exists(collection: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::AlreadyExists {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// True for create-if-absent conflicts.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → QueryFailed (message kept)
/// sqlx::Error::PoolTimedOut   → Unavailable
/// sqlx::Error::PoolClosed     → Unavailable
/// Other                       → Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".to_string()),
            sqlx::Error::PoolClosed => StoreError::Unavailable("pool is closed".to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
