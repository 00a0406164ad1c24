use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::TicketStatus;

/// A customer support ticket.
///
/// `creator_id` never changes after creation. `status` only moves through the
/// lifecycle rules and `updated_at` never decreases.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SupportTicket {
    pub id: String,
    pub creator_id: String,
    pub title: String,
    /// Opening message written by the creator at intake.
    pub message: String,
    pub attachment_url: Option<String>,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Intake payload for a new ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub message: String,
    pub attachment_url: Option<String>,
}

/// A status edge taken by an accepted mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChange {
    pub from: TicketStatus,
    pub to: TicketStatus,
}
