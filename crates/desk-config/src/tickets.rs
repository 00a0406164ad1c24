//! Ticket content limits.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_max_message_len() -> usize {
    5000
}

const fn default_max_title_len() -> usize {
    200
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketsConfig {
    /// Maximum message length in characters.
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,

    /// Maximum ticket title length in characters.
    #[serde(default = "default_max_title_len")]
    pub max_title_len: usize,
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            max_message_len: default_max_message_len(),
            max_title_len: default_max_title_len(),
        }
    }
}

impl TicketsConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_len == 0 {
            return Err(ConfigError::invalid(
                "tickets.max_message_len",
                "must be at least 1",
            ));
        }
        if self.max_title_len == 0 {
            return Err(ConfigError::invalid(
                "tickets.max_title_len",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = TicketsConfig::default();
        assert_eq!(config.max_message_len, 5000);
        assert_eq!(config.max_title_len, 200);
    }
}
