//! # Database Errors
//!
//! Everything fallible in this crate returns [`DbResult`]. Raw
//! [`sqlx::Error`] values are converted at the crate boundary so that
//! callers match on variants instead of sniffing message strings.
//!
//! ## How sqlx Failures Map
//! ```text
//! ┌──────────────────────────────┬───────────────────────────────────┐
//! │ sqlx failure                 │ DbError                           │
//! ├──────────────────────────────┼───────────────────────────────────┤
//! │ RowNotFound                  │ NotFound                          │
//! │ Database: UNIQUE constraint  │ UniqueViolation (column captured) │
//! │ Database: FOREIGN KEY        │ ForeignKeyViolation               │
//! │ Database: other              │ QueryFailed                       │
//! │ PoolTimedOut                 │ PoolExhausted                     │
//! │ PoolClosed                   │ ConnectionFailed                  │
//! │ anything else                │ Internal                          │
//! └──────────────────────────────┴───────────────────────────────────┘
//! ```
//!
//! `kirana-billing` wraps [`DbError`] transparently, so these variants
//! are what the till code ultimately matches on.

use thiserror::Error;

/// Shorthand result for every fallible operation in this crate.
pub type DbResult<T> = Result<T, DbError>;

/// Failure categories for SQLite access.
#[derive(Debug, Error)]
pub enum DbError {
    /// The pool could not reach or keep the SQLite file open.
    ///
    /// ## When This Occurs
    /// - Parent directory missing or unwritable
    /// - Pool closed while a query was still waiting
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    /// A schema migration did not apply cleanly.
    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// No row matched the requested id.
    ///
    /// ## When This Occurs
    /// - `fetch_one` on an id that was never inserted
    /// - Receipt lookup with a mistyped purchase id
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected an insert.
    ///
    /// ## When This Occurs
    /// - Second customer row for the same email
    /// - Re-registering an existing product code
    #[error("Duplicate {field}: '{value}'")]
    UniqueViolation { field: String, value: String },

    /// A row referenced a parent that does not exist.
    ///
    /// ## When This Occurs
    /// - Purchase item pointing at an unknown purchase or product
    #[error("Foreign key constraint violated: {message}")]
    ForeignKeyViolation { message: String },

    /// SQLite rejected a statement at execution time.
    ///
    /// CHECK constraints (non-negative stock, positive prices) land
    /// here as well.
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// A checkout transaction could not commit.
    #[error("Transaction aborted: {0}")]
    TransactionFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("No free database connections in the pool")]
    PoolExhausted,

    /// A JSON column would not encode or decode.
    ///
    /// ## When This Occurs
    /// - Corrupt change breakdown payload on a stored purchase
    #[error("JSON column error: {0}")]
    Serialization(String),

    /// Anything sqlx reports that has no mapping above.
    #[error("Unexpected database failure: {0}")]
    Internal(String),
}

impl DbError {
    /// Builds a [`DbError::NotFound`] from an entity label and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Builds a [`DbError::UniqueViolation`] with a known value.
    ///
    /// The `From<sqlx::Error>` path only learns the column name, so
    /// repositories that want the offending value in the message
    /// construct the error themselves.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `true` when the error is a UNIQUE index rejection.
    ///
    /// `get_or_create` uses this to tell "another connection inserted
    /// the row first" apart from a genuine failure.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => classify_database_error(db_err.message()),
            sqlx::Error::PoolTimedOut => Self::PoolExhausted,
            sqlx::Error::PoolClosed => Self::ConnectionFailed("pool is closed".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Sorts a raw SQLite message into a constraint-specific variant.
///
/// SQLite reports constraint failures as plain text:
/// `UNIQUE constraint failed: customers.email` and
/// `FOREIGN KEY constraint failed`. The UNIQUE form carries the
/// offending `table.column`, which becomes the `field`.
fn classify_database_error(msg: &str) -> DbError {
    if let Some((_, column)) = msg.split_once("UNIQUE constraint failed: ") {
        return DbError::UniqueViolation {
            field: column.to_string(),
            value: "unknown".to_string(),
        };
    }
    if msg.contains("FOREIGN KEY constraint failed") {
        return DbError::ForeignKeyViolation {
            message: msg.to_string(),
        };
    }
    DbError::QueryFailed(msg.to_string())
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_message_captures_column() {
        let err = classify_database_error("UNIQUE constraint failed: customers.email");
        assert!(err.is_unique_violation());
        match err {
            DbError::UniqueViolation { field, .. } => assert_eq!(field, "customers.email"),
            other => panic!("expected UniqueViolation, got {other}"),
        }
    }

    #[test]
    fn test_foreign_key_message_classified() {
        let err = classify_database_error("FOREIGN KEY constraint failed");
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[test]
    fn test_other_messages_become_query_failed() {
        let err = classify_database_error("CHECK constraint failed: products");
        assert!(matches!(err, DbError::QueryFailed(_)));
    }

    #[test]
    fn test_duplicate_helper_is_unique_violation() {
        let err = DbError::duplicate("customers.email", "ali@example.com");
        assert!(err.is_unique_violation());
        assert_eq!(err.to_string(), "Duplicate customers.email: 'ali@example.com'");
    }

    #[test]
    fn test_bad_json_maps_to_serialization() {
        let bad = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        assert!(matches!(DbError::from(bad), DbError::Serialization(_)));
    }
}
