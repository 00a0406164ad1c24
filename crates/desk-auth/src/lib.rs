//! # desk-auth
//!
//! Role-scoped authorization for the support desk.
//!
//! Provides the [`RoleAuthority`] that resolves session tokens through a
//! [`desk_core::ports::SessionValidator`] and answers ticket capability
//! questions, plus the client-side token store used by the `desk` binary.

pub mod authority;
pub mod error;
pub mod token_store;

pub use authority::RoleAuthority;
pub use error::AuthError;
pub use token_store::{TokenStore, resolve_token};
