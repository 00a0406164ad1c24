//! Session lifetime.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Upper bound on session lifetime: ten years.
pub const MAX_TTL_SECS: u64 = 10 * 366 * 24 * 3600;

const fn default_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionsConfig {
    /// Seconds a newly issued session stays valid.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl SessionsConfig {
    /// Session lifetime as a chrono delta, clamped to [`MAX_TTL_SECS`].
    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        let secs = i64::try_from(self.ttl_secs.min(MAX_TTL_SECS)).unwrap_or(i64::MAX);
        TimeDelta::seconds(secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_secs == 0 {
            return Err(ConfigError::invalid("sessions.ttl_secs", "must be at least 1"));
        }
        if self.ttl_secs > MAX_TTL_SECS {
            return Err(ConfigError::invalid(
                "sessions.ttl_secs",
                format!("must be at most {MAX_TTL_SECS}"),
            ));
        }
        Ok(())
    }
}
