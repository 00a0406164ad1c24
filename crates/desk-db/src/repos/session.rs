//! Session repository: issue, validate, revoke.
//!
//! A session binds an opaque token to an identity and a role for a fixed
//! lifetime. Lookups only return sessions that are neither revoked nor
//! expired.

use chrono::{DateTime, TimeDelta, Utc};

use desk_core::identity::{Identity, Session};

use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, now_micros, parse_datetime, parse_enum};
use crate::service::DeskService;

fn row_to_session(row: &libsql::Row) -> Result<Session, DatabaseError> {
    Ok(Session {
        identity: Identity {
            id: row.get(0)?,
            role: parse_enum(&row.get::<String>(1)?)?,
        },
        issued_at: parse_datetime(&row.get::<String>(2)?)?,
        expires_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl DeskService {
    /// Issue a new session for `identity` valid for `ttl`.
    ///
    /// Returns the opaque bearer token together with the stored session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a blank user id or a
    /// non-positive `ttl`, or `DatabaseError` if the INSERT fails.
    pub async fn issue_session(
        &self,
        identity: &Identity,
        ttl: TimeDelta,
    ) -> Result<(String, Session), DatabaseError> {
        if identity.id.trim().is_empty() {
            return Err(DatabaseError::InvalidState("user id must not be blank".into()));
        }
        if ttl <= TimeDelta::zero() {
            return Err(DatabaseError::InvalidState("session ttl must be positive".into()));
        }

        let _guard = self.db().lock_conn().await;
        let token = self.db().generate_token().await?;
        let issued_at = now_micros();
        let expires_at = issued_at + ttl;

        self.db()
            .conn()
            .execute(
                "INSERT INTO sessions (token, user_id, role, issued_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    token.as_str(),
                    identity.id.as_str(),
                    identity.role.as_str(),
                    format_timestamp(issued_at),
                    format_timestamp(expires_at)
                ],
            )
            .await?;

        tracing::info!(user_id = %identity.id, role = %identity.role, "session issued");
        Ok((
            token,
            Session {
                identity: identity.clone(),
                issued_at,
                expires_at,
            },
        ))
    }

    /// Look up a live session by token as of `now`.
    ///
    /// Returns `None` for unknown, revoked, or expired tokens.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_live_session(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, DatabaseError> {
        let _guard = self.db().lock_conn().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT user_id, role, issued_at, expires_at FROM sessions
                 WHERE token = ?1 AND revoked_at IS NULL AND expires_at > ?2",
                libsql::params![token, format_timestamp(now)],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_session(&row)?)),
            None => Ok(None),
        }
    }

    /// Revoke a session. Returns `false` if the token was unknown or already revoked.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn revoke_session(&self, token: &str) -> Result<bool, DatabaseError> {
        let _guard = self.db().lock_conn().await;
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE sessions SET revoked_at = ?1 WHERE token = ?2 AND revoked_at IS NULL",
                libsql::params![format_timestamp(now_micros()), token],
            )
            .await?;
        if changed > 0 {
            tracing::info!("session revoked");
        }
        Ok(changed > 0)
    }

    /// Revoke every live session of a user. Returns how many were revoked.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn revoke_user_sessions(&self, user_id: &str) -> Result<u64, DatabaseError> {
        let _guard = self.db().lock_conn().await;
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE sessions SET revoked_at = ?1 WHERE user_id = ?2 AND revoked_at IS NULL",
                libsql::params![format_timestamp(now_micros()), user_id],
            )
            .await?;
        tracing::info!(user_id, revoked = changed, "user sessions revoked");
        Ok(changed)
    }

    /// Delete sessions that expired or were revoked before `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the DELETE fails.
    pub async fn purge_sessions(&self, cutoff: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let _guard = self.db().lock_conn().await;
        let cutoff = format_timestamp(cutoff);
        let removed = self
            .db()
            .conn()
            .execute(
                "DELETE FROM sessions WHERE expires_at <= ?1 OR revoked_at <= ?1",
                [cutoff.as_str()],
            )
            .await?;
        tracing::debug!(removed, "stale sessions purged");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use desk_core::enums::Role;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn issued_session_is_live() {
        let svc = test_service().await;
        let identity = Identity::new("user_1", Role::Customer);
        let (token, issued) = svc
            .issue_session(&identity, TimeDelta::hours(1))
            .await
            .unwrap();

        let found = svc.find_live_session(&token, Utc::now()).await.unwrap();
        assert_eq!(found, Some(issued));
    }

    #[tokio::test]
    async fn unknown_token_is_none() {
        let svc = test_service().await;
        assert_eq!(svc.find_live_session("nope", Utc::now()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_session_is_not_found() {
        let svc = test_service().await;
        let identity = Identity::new("user_1", Role::Admin);
        let (token, session) = svc
            .issue_session(&identity, TimeDelta::seconds(30))
            .await
            .unwrap();

        assert!(
            svc.find_live_session(&token, session.expires_at)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            svc.find_live_session(&token, session.expires_at - TimeDelta::microseconds(1))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn revoked_session_is_not_found() {
        let svc = test_service().await;
        let identity = Identity::new("user_1", Role::Customer);
        let (token, _) = svc
            .issue_session(&identity, TimeDelta::hours(1))
            .await
            .unwrap();

        assert!(svc.revoke_session(&token).await.unwrap());
        assert!(!svc.revoke_session(&token).await.unwrap());
        assert!(svc.find_live_session(&token, Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoke_user_sessions_only_touches_that_user() {
        let svc = test_service().await;
        let alice = Identity::new("alice", Role::Customer);
        let bob = Identity::new("bob", Role::Customer);
        svc.issue_session(&alice, TimeDelta::hours(1)).await.unwrap();
        svc.issue_session(&alice, TimeDelta::hours(1)).await.unwrap();
        let (bob_token, _) = svc.issue_session(&bob, TimeDelta::hours(1)).await.unwrap();

        assert_eq!(svc.revoke_user_sessions("alice").await.unwrap(), 2);
        assert!(svc.find_live_session(&bob_token, Utc::now()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn purge_removes_expired_rows() {
        let svc = test_service().await;
        let identity = Identity::new("user_1", Role::Customer);
        let (_, session) = svc
            .issue_session(&identity, TimeDelta::seconds(5))
            .await
            .unwrap();
        svc.issue_session(&identity, TimeDelta::hours(2)).await.unwrap();

        let removed = svc.purge_sessions(session.expires_at).await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn rejects_blank_user_and_bad_ttl() {
        let svc = test_service().await;
        assert!(matches!(
            svc.issue_session(&Identity::new("  ", Role::Customer), TimeDelta::hours(1))
                .await,
            Err(DatabaseError::InvalidState(_))
        ));
        assert!(matches!(
            svc.issue_session(&Identity::new("u", Role::Customer), TimeDelta::zero())
                .await,
            Err(DatabaseError::InvalidState(_))
        ));
    }
}
