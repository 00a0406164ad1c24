//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! fix the shape of the details written by the ticket store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{TicketAction, TicketStatus};

/// Detail for `AuditAction::StatusChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: TicketStatus,
    pub to: TicketStatus,
    /// Explicit action that caused the change; `None` when a reply did.
    pub action: Option<TicketAction>,
}

/// Detail for `AuditAction::MessageAdded`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MessageAddedDetail {
    pub message_id: String,
    pub seq: i64,
}
