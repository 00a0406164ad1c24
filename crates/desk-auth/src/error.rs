use desk_core::errors::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated; run `desk session login`")]
    NotAuthenticated,

    #[error("session expired; run `desk session login` to start a new one")]
    SessionExpired,

    #[error("permission denied")]
    Forbidden,

    #[error("session validation failed: {0}")]
    Validator(#[from] StoreError),

    #[error("token store error: {0}")]
    TokenStoreError(String),
}

impl AuthError {
    /// Whether the caller should be sent back to log in.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::SessionExpired)
    }
}
