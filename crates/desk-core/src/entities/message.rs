use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// One entry in a ticket's append-only message thread.
///
/// Never mutated or removed once stored. `seq` is the store-assigned insertion
/// order and breaks ties between equal `created_at` values.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub ticket_id: String,
    pub seq: i64,
    pub sender_id: String,
    pub sender_role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated message waiting to be appended. The store assigns `id`, `seq`,
/// and `created_at`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewMessage {
    pub sender_id: String,
    pub sender_role: Role,
    pub content: String,
    pub idempotency_key: Option<String>,
}
