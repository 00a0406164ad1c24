//! Entity structs for the support desk domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON output and schema
//! generation.

mod audit;
mod message;
mod ticket;

pub use audit::AuditEntry;
pub use message::{Message, NewMessage};
pub use ticket::{NewTicket, StatusChange, SupportTicket};
