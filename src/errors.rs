//! Unified error types for the stock control crate.
//!
//! Every fallible operation returns [`Result`]. Business-rule rejections
//! (`Locked`) are ordinary variants rather than panics so callers can show
//! the reason to the user.

use crate::core::DocumentKind;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Errors raised by configuration, sequencing and document operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration, including code templates
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// Deletion blocked because a guarded child collection is not empty
    #[error("{reason}")]
    Locked {
        /// Kind of the document that cannot be deleted
        kind: DocumentKind,
        /// Id of the document that cannot be deleted
        id: i64,
        /// Human-readable reason naming the blocking relationship
        reason: String,
    },

    /// Code assignment kept colliding with concurrent creations
    #[error("Code assignment for {kind} in {year} conflicted {attempts} times, giving up")]
    Conflict {
        /// Kind whose sequence was contended
        kind: DocumentKind,
        /// Calendar year of the contended sequence
        year: i32,
        /// Attempts made before giving up
        attempts: u32,
    },

    /// A document referenced by id does not exist
    #[error("{kind} with id {id} not found")]
    DocumentNotFound {
        /// Kind of the missing document
        kind: DocumentKind,
        /// Id that was looked up
        id: i64,
    },

    /// Error reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Returns true when the error is a write-write conflict that a fresh
    /// attempt of the whole creation could resolve.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(err) => is_write_conflict(err),
            _ => false,
        }
    }
}

/// SQLite `BUSY`/`LOCKED` (plus extended codes) and PostgreSQL
/// serialization failure / deadlock.
const CONFLICT_CODES: [&str; 6] = ["5", "6", "261", "517", "40001", "40P01"];

fn is_write_conflict(err: &DbErr) -> bool {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return true;
    }

    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .is_some_and(|code| CONFLICT_CODES.contains(&code.as_ref())),
        _ => false,
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_error_displays_reason_only() {
        let err = Error::Locked {
            kind: DocumentKind::RequestStock,
            id: 7,
            reason: "Cannot delete request stock model, relationship between request stock model and lines".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete request stock model, relationship between request stock model and lines"
        );
    }

    #[test]
    fn test_non_database_errors_are_not_retryable() {
        let err = Error::Config {
            message: "bad".to_string(),
        };
        assert!(!err.is_retryable());

        let err = Error::Conflict {
            kind: DocumentKind::OutgoingAlbaran,
            year: 2024,
            attempts: 3,
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_record_not_found_is_not_retryable() {
        let err = Error::Database(DbErr::RecordNotFound("gone".to_string()));
        assert!(!err.is_retryable());
    }
}
