//! # desk-support
//!
//! The mutation path for support tickets.
//!
//! - [`ReplyGateway`] is the single entry point that changes a ticket: it
//!   resolves the caller, loads and authorizes the ticket, applies the
//!   lifecycle rules, and performs the atomic append-and-update through the
//!   store, retrying compare-and-swap conflicts with backoff.
//! - [`MessageThread`] validates and appends messages and lists a thread in
//!   order.
//! - [`LogNotifier`] and [`BroadcastNotifier`] receive view invalidations
//!   after every accepted mutation.

pub mod error;
pub mod gateway;
pub mod notifier;
pub mod thread;

pub use error::ReplyError;
pub use gateway::{Accepted, ReplyGateway, ThreadView, Transitioned};
pub use notifier::{BroadcastNotifier, LogNotifier};
pub use thread::MessageThread;
