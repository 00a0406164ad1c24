//! libSQL database location.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// In-memory database path understood by libSQL.
pub const IN_MEMORY: &str = ":memory:";

fn default_path() -> String {
    ".desk/desk.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the local database file, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    /// Check if the database lives only for the lifetime of the process.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::invalid("database.path", "must not be empty"));
        }
        Ok(())
    }
}
