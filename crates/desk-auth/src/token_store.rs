//! Client-side storage of the session token used by the `desk` binary.
//!
//! Lookup order: explicit value → `DESK_TOKEN` env → credentials file
//! (`~/.desk/credentials`). The file is written with `0600` permissions.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuthError;

const TOKEN_ENV_VAR: &str = "DESK_TOKEN";
const CREDENTIALS_DIR_NAME: &str = ".desk";
const CREDENTIALS_FILE_NAME: &str = "credentials";

/// A credentials file location.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store rooted at `~/.desk/credentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the home directory is unknown.
    pub fn default_location() -> Result<Self, AuthError> {
        dirs::home_dir()
            .map(|h| Self::at(h.join(CREDENTIALS_DIR_NAME).join(CREDENTIALS_FILE_NAME)))
            .ok_or_else(|| {
                AuthError::TokenStoreError(
                    "home directory not found; cannot store credentials".into(),
                )
            })
    }

    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the file cannot be written.
    pub fn store(&self, token: &str) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::TokenStoreError(format!("mkdir {}: {e}", parent.display()))
            })?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                    tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
                }
            }
        }
        fs::write(&self.path, token).map_err(|e| {
            AuthError::TokenStoreError(format!("write {}: {e}", self.path.display()))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                AuthError::TokenStoreError(format!("chmod {}: {e}", self.path.display()))
            })?;
        }

        Ok(())
    }

    /// Read the stored token. Empty or whitespace-only files count as absent.
    #[must_use]
    pub fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Remove the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the file exists but cannot be removed.
    pub fn delete(&self) -> Result<(), AuthError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                AuthError::TokenStoreError(format!(
                    "failed to delete {}: {e}",
                    self.path.display()
                ))
            })?;
        }
        Ok(())
    }
}

/// Resolve the best available token. Priority: `explicit` → `DESK_TOKEN` → file.
///
/// Does NOT validate the token; that is the role authority's job.
#[must_use]
pub fn resolve_token(explicit: Option<&str>, store: Option<&TokenStore>) -> Option<String> {
    if let Some(token) = explicit.filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR)
        && !token.is_empty()
    {
        return Some(token);
    }
    store.and_then(TokenStore::load)
}
