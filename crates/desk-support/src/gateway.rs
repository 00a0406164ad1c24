//! Reply gateway: the only place a ticket or its thread is mutated.
//!
//! A reply runs these steps:
//!
//! 1. Resolve the caller from the session token.
//! 2. Load the ticket. Non-staff callers use the creator-scoped lookup, so a
//!    ticket they do not own is `NotFound`, exactly like a missing one.
//! 3. Authorize access, yielding the caller's capacity (creator or staff).
//! 4. Validate the content.
//! 5. Derive the lifecycle change implied by the reply.
//! 6. Append the message and update the ticket atomically, compare-and-swap
//!    on the ticket's `updated_at`.
//! 7. Invalidate the affected views.
//!
//! Steps 1 to 5 have no side effects. When step 6 reports a conflict or a
//! transient failure, steps 2 to 6 run again on a fresh read after a backoff
//! delay. Every other storage failure is returned as is and never retried.

use std::time::Duration;

use desk_auth::RoleAuthority;
use desk_config::RetryConfig;
use desk_core::entities::{Message, StatusChange, SupportTicket};
use desk_core::enums::{ActorKind, TicketAction};
use desk_core::errors::StoreError;
use desk_core::identity::Identity;
use desk_core::lifecycle::{explicit_transition, reply_transition};
use desk_core::ports::{ChangeNotifier, SessionValidator, StatusUpdate, TicketStore, ViewKey};
use desk_core::validation::validate_text;
use serde::Serialize;

use crate::error::ReplyError;
use crate::thread::MessageThread;

/// Longest accepted idempotency key, in characters.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 128;

/// Result of an accepted reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accepted {
    pub message: Message,
    /// The ticket as stored after the reply.
    pub ticket: SupportTicket,
    /// Status change caused by this reply, if any. Always `None` on replay.
    pub transition: Option<StatusChange>,
    /// `true` if the idempotency key matched an earlier reply and nothing
    /// new was written.
    pub replayed: bool,
}

/// Result of an explicit staff action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transitioned {
    pub ticket: SupportTicket,
    pub change: StatusChange,
}

/// A ticket together with its ordered thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadView {
    pub ticket: SupportTicket,
    pub messages: Vec<Message>,
    /// The capacity in which the caller sees the ticket.
    pub viewer: ActorKind,
}

/// Single entry point for ticket replies and explicit status actions.
pub struct ReplyGateway<S, V, N> {
    authority: RoleAuthority<V>,
    thread: MessageThread<S>,
    notifier: N,
    retry: RetryConfig,
}

impl<S, V, N> ReplyGateway<S, V, N>
where
    S: TicketStore,
    V: SessionValidator,
    N: ChangeNotifier,
{
    pub const fn new(
        authority: RoleAuthority<V>,
        thread: MessageThread<S>,
        notifier: N,
        retry: RetryConfig,
    ) -> Self {
        Self {
            authority,
            thread,
            notifier,
            retry,
        }
    }

    #[must_use]
    pub const fn authority(&self) -> &RoleAuthority<V> {
        &self.authority
    }

    #[must_use]
    pub const fn thread(&self) -> &MessageThread<S> {
        &self.thread
    }

    /// Submit a reply to a ticket.
    ///
    /// With an `idempotency_key`, a repeated submission by the same sender
    /// returns the originally stored message with `replayed = true` and
    /// writes nothing.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` for a missing, unknown, or expired token (the store
    ///   is never touched)
    /// - `NotFound` if the ticket does not exist or the caller may not see it
    /// - `Forbidden` if the caller is not entitled to the ticket
    /// - `Validation` for empty or over-long content, or a key reused by
    ///   another sender
    /// - `TicketClosed` if the ticket no longer accepts replies
    /// - `Storage` if the store fails, or conflicts persist past the retry budget
    pub async fn submit_reply(
        &self,
        token: Option<&str>,
        ticket_id: &str,
        content: &str,
        idempotency_key: Option<&str>,
    ) -> Result<Accepted, ReplyError> {
        let identity = self.authority.resolve(token).await?;

        let mut attempt = 1;
        let accepted = loop {
            match self
                .reply_once(&identity, ticket_id, content, idempotency_key)
                .await
            {
                Ok(accepted) => break accepted,
                Err(error) => match self.backoff(&error, attempt) {
                    Some(delay) => {
                        tracing::debug!(ticket_id, attempt, %error, ?delay, "retrying reply");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        log_failure("reply", ticket_id, &identity, attempt, &error);
                        return Err(error);
                    }
                },
            }
        };

        if accepted.replayed {
            tracing::debug!(ticket_id, message_id = %accepted.message.id, "reply replayed");
        } else {
            tracing::info!(
                ticket_id,
                message_id = %accepted.message.id,
                actor = %identity.id,
                transition = ?accepted.transition,
                "reply accepted"
            );
            self.notify(&accepted.ticket).await;
        }
        Ok(accepted)
    }

    /// Apply an explicit staff action (`start`, `resolve`, `close`).
    ///
    /// # Errors
    ///
    /// - `Unauthenticated`, `NotFound`, `Storage` as for [`Self::submit_reply`]
    /// - `Forbidden` if the caller is not staff
    /// - `TicketClosed` if the ticket is `closed`
    /// - `InvalidTransition` if the action does not follow a lifecycle edge
    ///   from the current status
    pub async fn transition(
        &self,
        token: Option<&str>,
        ticket_id: &str,
        action: TicketAction,
    ) -> Result<Transitioned, ReplyError> {
        let identity = self.authority.resolve(token).await?;

        let mut attempt = 1;
        let transitioned = loop {
            match self.transition_once(&identity, ticket_id, action).await {
                Ok(transitioned) => break transitioned,
                Err(error) => match self.backoff(&error, attempt) {
                    Some(delay) => {
                        tracing::debug!(ticket_id, attempt, %error, ?delay, "retrying transition");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        log_failure("transition", ticket_id, &identity, attempt, &error);
                        return Err(error);
                    }
                },
            }
        };

        tracing::info!(
            ticket_id,
            actor = %identity.id,
            from = %transitioned.change.from,
            to = %transitioned.change.to,
            "ticket transitioned"
        );
        self.notify(&transitioned.ticket).await;
        Ok(transitioned)
    }

    /// Read a ticket and its ordered thread. Never writes.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, `NotFound`, `Forbidden`, or `Storage`, with the same
    /// rules as [`Self::submit_reply`].
    pub async fn view_thread(
        &self,
        token: Option<&str>,
        ticket_id: &str,
    ) -> Result<ThreadView, ReplyError> {
        let identity = self.authority.resolve(token).await?;
        let ticket = self.load_ticket(&identity, ticket_id).await?;
        let viewer = self.authority.authorize_ticket_access(&identity, &ticket)?;
        let messages = self.thread.list_ordered(&ticket.id).await?;
        Ok(ThreadView {
            ticket,
            messages,
            viewer,
        })
    }

    /// Steps 2 to 6 of a reply.
    async fn reply_once(
        &self,
        identity: &Identity,
        ticket_id: &str,
        content: &str,
        idempotency_key: Option<&str>,
    ) -> Result<Accepted, ReplyError> {
        let ticket = self.load_ticket(identity, ticket_id).await?;
        let actor = self.authority.authorize_ticket_access(identity, &ticket)?;
        self.thread.validate(content)?;
        if let Some(key) = idempotency_key {
            validate_text("idempotency_key", key, MAX_IDEMPOTENCY_KEY_LEN)?;
        }

        if let Some(key) = idempotency_key
            && let Some(accepted) = self.replay(identity, &ticket, key).await?
        {
            return Ok(accepted);
        }

        let transition = reply_transition(ticket.status, actor)?;
        match self
            .thread
            .append(&ticket, identity, content, idempotency_key, transition)
            .await
        {
            Ok(outcome) => Ok(Accepted {
                message: outcome.message,
                ticket: outcome.ticket,
                transition,
                replayed: false,
            }),
            // A concurrent submission with the same key won the race.
            Err(ReplyError::Storage(StoreError::DuplicateIdempotencyKey { key, .. })) => self
                .replay(identity, &ticket, &key)
                .await?
                .ok_or(ReplyError::Storage(StoreError::Conflict {
                    ticket_id: ticket.id,
                })),
            Err(error) => Err(error),
        }
    }

    /// Look up an earlier reply stored under `key`.
    async fn replay(
        &self,
        identity: &Identity,
        ticket: &SupportTicket,
        key: &str,
    ) -> Result<Option<Accepted>, ReplyError> {
        let store = self.thread.store();
        let Some(message) = store.find_message_by_idempotency_key(&ticket.id, key).await? else {
            return Ok(None);
        };
        if message.sender_id != identity.id {
            return Err(ReplyError::Validation {
                field: "idempotency_key",
                message: "already used for a different reply".into(),
            });
        }
        let current = store
            .find_ticket_by_id(&ticket.id)
            .await?
            .ok_or(ReplyError::NotFound)?;
        Ok(Some(Accepted {
            message,
            ticket: current,
            transition: None,
            replayed: true,
        }))
    }

    async fn transition_once(
        &self,
        identity: &Identity,
        ticket_id: &str,
        action: TicketAction,
    ) -> Result<Transitioned, ReplyError> {
        let ticket = self.load_ticket(identity, ticket_id).await?;
        self.authority.authorize_ticket_access(identity, &ticket)?;

        let change = match explicit_transition(ticket.status, action) {
            Ok(change) if self.authority.can_transition(identity, change.from, change.to) => {
                change
            }
            Err(error) if identity.is_staff() => return Err(error.into()),
            _ => return Err(ReplyError::Forbidden),
        };

        let ticket = self
            .thread
            .store()
            .update_ticket_status(
                &ticket.id,
                &StatusUpdate {
                    actor_id: identity.id.clone(),
                    expected_updated_at: ticket.updated_at,
                    change,
                    action,
                },
            )
            .await?;
        Ok(Transitioned { ticket, change })
    }

    /// Load a ticket the way `identity` is allowed to see it.
    async fn load_ticket(
        &self,
        identity: &Identity,
        ticket_id: &str,
    ) -> Result<SupportTicket, ReplyError> {
        let store = self.thread.store();
        let ticket = if identity.is_staff() {
            store.find_ticket_by_id(ticket_id).await?
        } else {
            store
                .find_ticket_by_id_for_creator(ticket_id, &identity.id)
                .await?
        };
        ticket.ok_or(ReplyError::NotFound)
    }

    /// Delay before the next attempt, or `None` if `error` is final.
    fn backoff(&self, error: &ReplyError, attempt: u32) -> Option<Duration> {
        (error.is_retryable() && attempt < self.retry.max_attempts)
            .then(|| self.retry.delay_before_retry(attempt))
    }

    async fn notify(&self, ticket: &SupportTicket) {
        let keys = ViewKey::affected_by(ticket);
        if let Err(error) = self.notifier.invalidate(&keys).await {
            tracing::warn!(ticket_id = %ticket.id, %error, "view invalidation failed");
        }
    }
}

fn log_failure(op: &str, ticket_id: &str, identity: &Identity, attempt: u32, error: &ReplyError) {
    match error {
        ReplyError::Storage(inner) => {
            tracing::warn!(op, ticket_id, actor = %identity.id, attempt, error = %inner, "storage failure");
        }
        other => {
            tracing::debug!(op, ticket_id, actor = %identity.id, code = other.code(), "rejected");
        }
    }
}
