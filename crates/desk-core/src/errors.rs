//! Cross-cutting error types for the support desk.
//!
//! Errors raised across crate boundaries live here: lifecycle rule violations,
//! content validation failures, and the failure types of the collaborator ports
//! in [`crate::ports`]. Crate-local errors (`DatabaseError`, `AuthError`,
//! `ReplyError`) are defined in their own crates.

use thiserror::Error;

use crate::enums::TicketStatus;

/// A lifecycle rule rejected the requested change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The ticket no longer accepts writes of this kind.
    #[error("ticket is {status} and no longer accepts replies")]
    TicketClosed { status: TicketStatus },

    /// No lifecycle edge connects the two states.
    #[error("invalid ticket transition from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },
}

/// Field-level validation failure, safe to show to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Failures reported by a ticket store or session validator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The ticket changed since it was loaded; the compare-and-swap lost.
    #[error("ticket {ticket_id} was modified concurrently")]
    Conflict { ticket_id: String },

    /// The referenced ticket does not exist.
    #[error("ticket {ticket_id} not found")]
    TicketNotFound { ticket_id: String },

    /// A message with this idempotency key already exists on the ticket.
    #[error("duplicate idempotency key '{key}' on ticket {ticket_id}")]
    DuplicateIdempotencyKey { ticket_id: String, key: String },

    /// Infrastructure failure known to have left no trace; safe to retry.
    #[error("transient storage failure: {0}")]
    Transient(String),

    /// Any other failure. The write may or may not have happened.
    #[error("storage failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the failed write can be retried without risking a duplicate.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Transient(_))
    }
}

/// Failure to deliver a cache invalidation.
#[derive(Debug, Error)]
#[error("change notification failed: {0}")]
pub struct NotifyError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflicts_and_transient_failures_retry() {
        assert!(StoreError::Conflict { ticket_id: "tkt-1".into() }.is_retryable());
        assert!(StoreError::Transient("database is locked".into()).is_retryable());
        assert!(!StoreError::Backend("disk I/O error".into()).is_retryable());
        assert!(
            !StoreError::DuplicateIdempotencyKey {
                ticket_id: "tkt-1".into(),
                key: "k".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = ValidationError::new("content", "must not be empty");
        assert_eq!(err.to_string(), "content: must not be empty");
    }
}
