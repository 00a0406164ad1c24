//! # desk-core
//!
//! Core types, lifecycle rules, and collaborator contracts for the support desk.
//!
//! This crate provides the foundational types shared across all desk crates:
//! - Entity structs for tickets, messages, and audit entries
//! - The closed role set and the ticket status state machine
//! - Reply and explicit-action lifecycle rules
//! - Identity and session types handed over by the authentication layer
//! - Store, session validator, and change notifier traits
//! - Cross-cutting error types and text validation

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod lifecycle;
pub mod ports;
pub mod validation;
