//! Ticket lifecycle rules.
//!
//! Two kinds of mutation move a ticket's status:
//!
//! - **Replies.** A creator reply never changes the status. A staff reply
//!   moves `open` to `in_progress` and leaves `in_progress` unchanged apart from
//!   the timestamp bump. Replies to `resolved` or `closed` tickets are rejected
//!   for everyone; nothing re-opens a ticket.
//! - **Explicit actions.** `start`, `resolve`, and `close` each follow exactly one
//!   edge of [`TicketStatus::allowed_next_states`]. Whether the actor may take
//!   the edge at all is answered by the role authority, not here.

use crate::entities::StatusChange;
use crate::enums::{ActorKind, TicketAction, TicketStatus};
use crate::errors::LifecycleError;

/// Compute the status change implied by a reply from `actor` on a ticket in
/// `status`. `Ok(None)` means the message is appended and the status kept.
///
/// # Errors
///
/// Returns `LifecycleError::TicketClosed` when the ticket no longer accepts
/// replies.
pub const fn reply_transition(
    status: TicketStatus,
    actor: ActorKind,
) -> Result<Option<StatusChange>, LifecycleError> {
    if !status.accepts_replies() {
        return Err(LifecycleError::TicketClosed { status });
    }
    match (status, actor) {
        (TicketStatus::Open, ActorKind::Staff) => Ok(Some(StatusChange {
            from: TicketStatus::Open,
            to: TicketStatus::InProgress,
        })),
        _ => Ok(None),
    }
}

/// Compute the edge taken by an explicit `action` on a ticket in `status`.
///
/// # Errors
///
/// Returns `LifecycleError::TicketClosed` when `status` is terminal, or
/// `LifecycleError::InvalidTransition` when no edge leads to the action's
/// target.
pub fn explicit_transition(
    status: TicketStatus,
    action: TicketAction,
) -> Result<StatusChange, LifecycleError> {
    if status.is_terminal() {
        return Err(LifecycleError::TicketClosed { status });
    }
    let to = action.target();
    if !status.can_transition_to(to) {
        return Err(LifecycleError::InvalidTransition { from: status, to });
    }
    Ok(StatusChange { from: status, to })
}
