//! Repository modules implementing storage operations for desk entities.
//!
//! Each module adds methods to `DeskService` via `impl DeskService` blocks.

pub mod audit;
pub mod message;
pub mod session;
pub mod ticket;
