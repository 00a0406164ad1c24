use chrono::{DateTime, TimeDelta, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// Authenticated caller identity for cross-crate passing.
///
/// Produced by the session validator, consumed by `desk-auth` and
/// `desk-support`. Contains only data fields, no auth logic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Stable user identifier.
    pub id: String,
    /// Role fixed for the lifetime of the session that produced this identity.
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// A validated session as handed over by the authentication layer.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Check if the session is expired or expires within `buffer_secs`.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        self.is_expired_at(Utc::now() + TimeDelta::seconds(buffer_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session(expires_at: DateTime<Utc>) -> Session {
        Session {
            identity: Identity::new("user_test123", Role::Customer),
            issued_at: expires_at - TimeDelta::hours(1),
            expires_at,
        }
    }

    #[test]
    fn is_near_expiry_false_when_far_future() {
        let session = make_session(Utc::now() + TimeDelta::hours(1));
        assert!(!session.is_near_expiry(60));
    }

    #[test]
    fn is_near_expiry_true_when_past() {
        let session = make_session(Utc::now() - TimeDelta::seconds(10));
        assert!(session.is_near_expiry(60));
    }

    #[test]
    fn is_near_expiry_true_within_buffer() {
        let session = make_session(Utc::now() + TimeDelta::seconds(30));
        assert!(session.is_near_expiry(60));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let session = make_session(now);
        assert!(session.is_expired_at(now));
        assert!(!session.is_expired_at(now - TimeDelta::microseconds(1)));
    }

    #[test]
    fn staff_follows_role() {
        assert!(Identity::new("u1", Role::SuperAdmin).is_staff());
        assert!(!Identity::new("u2", Role::Manager).is_staff());
    }
}
