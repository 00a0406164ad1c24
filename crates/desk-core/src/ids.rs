//! ID prefix constants.
//!
//! IDs are generated by the database as `{prefix}-{8 hex chars}`, e.g.
//! `"tkt-a3f8b2c1"`. Session tokens are longer opaque hex strings and carry
//! no prefix.

pub const PREFIX_TICKET: &str = "tkt";
pub const PREFIX_MESSAGE: &str = "msg";
pub const PREFIX_AUDIT: &str = "aud";
