//! Caller-facing error taxonomy for ticket replies and actions.

use desk_auth::AuthError;
use desk_core::enums::TicketStatus;
use desk_core::errors::{LifecycleError, StoreError, ValidationError};
use thiserror::Error;

/// Every way a reply, action, or thread view can fail.
///
/// `NotFound` reads the same whether the ticket does not exist or belongs to
/// someone else. `Forbidden` carries no detail.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("not authenticated; log in to continue")]
    Unauthenticated,

    #[error("permission denied")]
    Forbidden,

    #[error("ticket not found")]
    NotFound,

    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("this ticket is {status} and no longer accepts changes")]
    TicketClosed { status: TicketStatus },

    #[error("cannot move a ticket from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },

    #[error("storage unavailable, try again")]
    Storage(#[source] StoreError),
}

impl ReplyError {
    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Validation { .. } => "validation_error",
            Self::TicketClosed { .. } => "ticket_closed",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Storage(_) => "storage_error",
        }
    }

    /// Whether the storage step may be attempted again with a fresh read.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}

impl From<AuthError> for ReplyError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::NotAuthenticated | AuthError::SessionExpired => Self::Unauthenticated,
            AuthError::Forbidden => Self::Forbidden,
            AuthError::Validator(inner) => Self::Storage(inner),
            AuthError::TokenStoreError(reason) => {
                tracing::debug!(%reason, "token store unreadable");
                Self::Unauthenticated
            }
        }
    }
}

impl From<LifecycleError> for ReplyError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::TicketClosed { status } => Self::TicketClosed { status },
            LifecycleError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
        }
    }
}

impl From<ValidationError> for ReplyError {
    fn from(error: ValidationError) -> Self {
        Self::Validation {
            field: error.field,
            message: error.message,
        }
    }
}

impl From<StoreError> for ReplyError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::TicketNotFound { .. } => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expired_and_missing_sessions_look_the_same() {
        assert!(matches!(
            ReplyError::from(AuthError::SessionExpired),
            ReplyError::Unauthenticated
        ));
        assert!(matches!(
            ReplyError::from(AuthError::NotAuthenticated),
            ReplyError::Unauthenticated
        ));
    }

    #[test]
    fn vanished_ticket_is_not_found() {
        let err = ReplyError::from(StoreError::TicketNotFound {
            ticket_id: "tkt-1".into(),
        });
        assert_eq!(err.to_string(), "ticket not found");
    }

    #[test]
    fn only_conflicts_and_transient_failures_retry() {
        assert!(
            ReplyError::from(StoreError::Conflict {
                ticket_id: "tkt-1".into()
            })
            .is_retryable()
        );
        assert!(ReplyError::from(StoreError::Transient("busy".into())).is_retryable());
        assert!(!ReplyError::from(StoreError::Backend("disk full".into())).is_retryable());
        assert!(!ReplyError::NotFound.is_retryable());
    }

    #[test]
    fn storage_message_is_generic() {
        let err = ReplyError::from(StoreError::Backend("disk I/O error at page 7".into()));
        assert_eq!(err.to_string(), "storage unavailable, try again");
        assert_eq!(err.code(), "storage_error");
    }

    #[test]
    fn validation_keeps_the_field() {
        let err = ReplyError::from(ValidationError::new("content", "must not be empty"));
        assert_eq!(err.to_string(), "content: must not be empty");
        assert_eq!(err.code(), "validation_error");
    }
}
