//! Database error types for desk-db.

use desk_core::errors::{StoreError, ValidationError};
use thiserror::Error;

use crate::retry::is_transient_libsql_error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The referenced ticket does not exist.
    #[error("Ticket {ticket_id} not found")]
    TicketNotFound { ticket_id: String },

    /// The ticket row changed since the caller last read it.
    #[error("Ticket {ticket_id} was modified concurrently")]
    Conflict { ticket_id: String },

    /// A message with this idempotency key already exists on the ticket.
    #[error("Duplicate idempotency key '{key}' on ticket {ticket_id}")]
    DuplicateKey { ticket_id: String, key: String },

    /// Input rejected before reaching SQL.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Conflict { ticket_id } => Self::Conflict { ticket_id },
            DatabaseError::TicketNotFound { ticket_id } => Self::TicketNotFound { ticket_id },
            DatabaseError::DuplicateKey { ticket_id, key } => {
                Self::DuplicateIdempotencyKey { ticket_id, key }
            }
            DatabaseError::LibSql(e) if is_transient_libsql_error(&e) => {
                Self::Transient(e.to_string())
            }
            other => Self::Backend(other.to_string()),
        }
    }
}
