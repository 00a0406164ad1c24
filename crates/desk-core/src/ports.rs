//! Collaborator contracts consumed by the support core.
//!
//! The reply gateway and role authority only ever talk to storage, sessions,
//! and cache invalidation through these traits. `desk-db` implements the store
//! and session validator on top of libSQL; `desk-support` ships the notifiers.
//!
//! Every method returns a `Send` future so one gateway can serve concurrent
//! requests from a multi-threaded runtime.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Message, NewMessage, StatusChange, SupportTicket};
use crate::enums::TicketAction;
use crate::errors::{NotifyError, StoreError};
use crate::identity::Session;

/// Ticket-side half of an atomic append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketUpdate {
    /// `updated_at` observed when the ticket was loaded; the write only
    /// applies if it is still current.
    pub expected_updated_at: DateTime<Utc>,
    /// Status edge implied by the reply, if any.
    pub status_change: Option<StatusChange>,
}

/// An explicit status change not tied to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub actor_id: String,
    pub expected_updated_at: DateTime<Utc>,
    pub change: StatusChange,
    pub action: TicketAction,
}

/// Result of a committed append-and-update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    pub message: Message,
    /// The ticket as it stands after the commit.
    pub ticket: SupportTicket,
}

/// Persistence contract for tickets and their message threads.
pub trait TicketStore: Send + Sync {
    /// Look a ticket up by id, regardless of owner.
    fn find_ticket_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<SupportTicket>, StoreError>> + Send;

    /// Look a ticket up by id, returning `None` unless `creator_id` opened it.
    fn find_ticket_by_id_for_creator(
        &self,
        id: &str,
        creator_id: &str,
    ) -> impl Future<Output = Result<Option<SupportTicket>, StoreError>> + Send;

    /// Append `message` and bump the ticket (plus its status, if changing) as
    /// one all-or-nothing write.
    ///
    /// Fails with `StoreError::Conflict` if `update.expected_updated_at` is
    /// stale and `StoreError::DuplicateIdempotencyKey` if the message key was
    /// already used on this ticket; nothing is written in either case.
    fn append_message_and_update_ticket(
        &self,
        ticket_id: &str,
        message: &NewMessage,
        update: &TicketUpdate,
    ) -> impl Future<Output = Result<AppendOutcome, StoreError>> + Send;

    /// Apply an explicit status change with the same compare-and-swap rules.
    fn update_ticket_status(
        &self,
        ticket_id: &str,
        update: &StatusUpdate,
    ) -> impl Future<Output = Result<SupportTicket, StoreError>> + Send;

    /// All messages of a ticket in thread order.
    fn list_messages(
        &self,
        ticket_id: &str,
    ) -> impl Future<Output = Result<Vec<Message>, StoreError>> + Send;

    /// The message previously appended under `key`, if any.
    fn find_message_by_idempotency_key(
        &self,
        ticket_id: &str,
        key: &str,
    ) -> impl Future<Output = Result<Option<Message>, StoreError>> + Send;
}

/// Black-box validation of opaque session tokens.
pub trait SessionValidator: Send + Sync {
    /// Resolve `token` to a live session. `Ok(None)` covers unknown, revoked,
    /// and expired tokens alike.
    fn validate(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;
}

/// Opaque key of a cached view affected by a ticket mutation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "view", content = "id")]
pub enum ViewKey {
    TicketDetail(String),
    CreatorTicketList(String),
    StaffTicketList,
}

impl ViewKey {
    /// Views to refresh after any accepted mutation of `ticket`.
    #[must_use]
    pub fn affected_by(ticket: &SupportTicket) -> BTreeSet<Self> {
        BTreeSet::from([
            Self::TicketDetail(ticket.id.clone()),
            Self::CreatorTicketList(ticket.creator_id.clone()),
            Self::StaffTicketList,
        ])
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TicketDetail(id) => write!(f, "/tickets/{id}"),
            Self::CreatorTicketList(creator_id) => write!(f, "/account/{creator_id}/tickets"),
            Self::StaffTicketList => f.write_str("/admin/tickets"),
        }
    }
}

/// Fire-and-forget invalidation of cached views.
pub trait ChangeNotifier: Send + Sync {
    fn invalidate(
        &self,
        keys: &BTreeSet<ViewKey>,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

impl<T: TicketStore> TicketStore for Arc<T> {
    fn find_ticket_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<SupportTicket>, StoreError>> + Send {
        (**self).find_ticket_by_id(id)
    }

    fn find_ticket_by_id_for_creator(
        &self,
        id: &str,
        creator_id: &str,
    ) -> impl Future<Output = Result<Option<SupportTicket>, StoreError>> + Send {
        (**self).find_ticket_by_id_for_creator(id, creator_id)
    }

    fn append_message_and_update_ticket(
        &self,
        ticket_id: &str,
        message: &NewMessage,
        update: &TicketUpdate,
    ) -> impl Future<Output = Result<AppendOutcome, StoreError>> + Send {
        (**self).append_message_and_update_ticket(ticket_id, message, update)
    }

    fn update_ticket_status(
        &self,
        ticket_id: &str,
        update: &StatusUpdate,
    ) -> impl Future<Output = Result<SupportTicket, StoreError>> + Send {
        (**self).update_ticket_status(ticket_id, update)
    }

    fn list_messages(
        &self,
        ticket_id: &str,
    ) -> impl Future<Output = Result<Vec<Message>, StoreError>> + Send {
        (**self).list_messages(ticket_id)
    }

    fn find_message_by_idempotency_key(
        &self,
        ticket_id: &str,
        key: &str,
    ) -> impl Future<Output = Result<Option<Message>, StoreError>> + Send {
        (**self).find_message_by_idempotency_key(ticket_id, key)
    }
}

impl<T: SessionValidator> SessionValidator for Arc<T> {
    fn validate(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send {
        (**self).validate(token)
    }
}

impl<T: ChangeNotifier> ChangeNotifier for Arc<T> {
    fn invalidate(
        &self,
        keys: &BTreeSet<ViewKey>,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send {
        (**self).invalidate(keys)
    }
}
