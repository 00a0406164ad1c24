//! Append-only message thread behind a ticket.

use desk_core::entities::{Message, NewMessage, StatusChange, SupportTicket};
use desk_core::identity::Identity;
use desk_core::ports::{AppendOutcome, TicketStore, TicketUpdate};
use desk_core::validation::validate_text;

use crate::error::ReplyError;

/// Validates, appends, and lists the messages of a ticket.
///
/// Messages are never edited or removed. Appending always goes through the
/// store's atomic append-and-update, so a message never exists without the
/// matching ticket timestamp bump.
#[derive(Debug, Clone)]
pub struct MessageThread<S> {
    store: S,
    max_len: usize,
}

impl<S: TicketStore> MessageThread<S> {
    /// `max_len` is the longest accepted message, in characters.
    pub const fn new(store: S, max_len: usize) -> Self {
        Self { store, max_len }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn max_len(&self) -> usize {
        self.max_len
    }

    /// Check message content: not blank, at most `max_len` characters.
    ///
    /// # Errors
    ///
    /// Returns `ReplyError::Validation` for the `content` field.
    pub fn validate(&self, content: &str) -> Result<(), ReplyError> {
        Ok(validate_text("content", content, self.max_len)?)
    }

    /// Append a message from `sender` to `ticket`, applying `status_change`
    /// in the same transaction.
    ///
    /// `ticket` must be the snapshot the caller based its decision on; the
    /// store rejects the write with a conflict if the ticket moved since.
    ///
    /// # Errors
    ///
    /// Returns `ReplyError::Validation` for bad content (nothing is written),
    /// `ReplyError::NotFound` if the ticket is gone, or `ReplyError::Storage`
    /// for conflicts and store failures.
    pub async fn append(
        &self,
        ticket: &SupportTicket,
        sender: &Identity,
        content: &str,
        idempotency_key: Option<&str>,
        status_change: Option<StatusChange>,
    ) -> Result<AppendOutcome, ReplyError> {
        self.validate(content)?;
        let message = NewMessage {
            sender_id: sender.id.clone(),
            sender_role: sender.role,
            content: content.to_string(),
            idempotency_key: idempotency_key.map(String::from),
        };
        let update = TicketUpdate {
            expected_updated_at: ticket.updated_at,
            status_change,
        };
        Ok(self
            .store
            .append_message_and_update_ticket(&ticket.id, &message, &update)
            .await?)
    }

    /// Messages of a ticket, oldest first. Re-querying yields the same order.
    ///
    /// # Errors
    ///
    /// Returns `ReplyError::Storage` if the store fails.
    pub async fn list_ordered(&self, ticket_id: &str) -> Result<Vec<Message>, ReplyError> {
        let mut messages = self.store.list_messages(ticket_id).await?;
        messages.sort_by_key(|message| message.seq);
        Ok(messages)
    }
}
