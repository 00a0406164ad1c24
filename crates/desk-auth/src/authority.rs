//! Role authority: one place that turns a session token into an identity and
//! answers ticket capability questions.
//!
//! Every surface (storefront, customer portal, admin) asks the same authority
//! instead of carrying its own copy of the role list.

use chrono::Utc;
use desk_core::entities::SupportTicket;
use desk_core::enums::{ActorKind, TicketStatus};
use desk_core::identity::Identity;
use desk_core::ports::SessionValidator;

use crate::error::AuthError;

/// Resolves sessions and checks ticket capabilities.
#[derive(Debug, Clone)]
pub struct RoleAuthority<V> {
    validator: V,
}

impl<V: SessionValidator> RoleAuthority<V> {
    pub const fn new(validator: V) -> Self {
        Self { validator }
    }

    /// Resolve an opaque session token into the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` for a missing or unknown token,
    /// `AuthError::SessionExpired` if the validator hands back a session past
    /// its expiry, and `AuthError::Validator` if the validator itself fails.
    pub async fn resolve(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NotAuthenticated)?;

        let session = self
            .validator
            .validate(token)
            .await?
            .ok_or(AuthError::NotAuthenticated)?;

        if session.is_expired_at(Utc::now()) {
            tracing::debug!(
                user_id = %session.identity.id,
                expires_at = %session.expires_at,
                "rejecting expired session"
            );
            return Err(AuthError::SessionExpired);
        }

        Ok(session.identity)
    }

    /// See [`authorize_ticket_access`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` if `identity` is neither staff nor the creator.
    pub fn authorize_ticket_access(
        &self,
        identity: &Identity,
        ticket: &SupportTicket,
    ) -> Result<ActorKind, AuthError> {
        authorize_ticket_access(identity, ticket)
    }

    /// See [`can_transition`].
    #[must_use]
    pub fn can_transition(&self, identity: &Identity, from: TicketStatus, to: TicketStatus) -> bool {
        can_transition(identity, from, to)
    }
}

/// Decide in which capacity `identity` may act on `ticket`.
///
/// Staff may act on any ticket. Everyone else may only act on tickets they
/// opened. A staff member who opened the ticket still acts as staff.
///
/// # Errors
///
/// Returns `AuthError::Forbidden` for every other identity, authenticated or not.
pub fn authorize_ticket_access(
    identity: &Identity,
    ticket: &SupportTicket,
) -> Result<ActorKind, AuthError> {
    if identity.is_staff() {
        Ok(ActorKind::Staff)
    } else if identity.id == ticket.creator_id {
        Ok(ActorKind::Creator)
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Whether `identity` may explicitly move a ticket from `from` to `to`.
///
/// Only staff drive explicit transitions, and only along lifecycle edges.
/// Nothing leaves `closed`.
#[must_use]
pub fn can_transition(identity: &Identity, from: TicketStatus, to: TicketStatus) -> bool {
    identity.is_staff() && from.can_transition_to(to)
}
