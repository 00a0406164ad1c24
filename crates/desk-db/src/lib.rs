//! # desk-db
//!
//! libSQL storage for the support desk.
//!
//! Handles all relational state: tickets, append-only message threads,
//! sessions, and the audit trail. Implements the [`TicketStore`] and
//! [`SessionValidator`] ports from `desk-core` on top of a local libSQL
//! database.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) in local mode.
//!
//! [`TicketStore`]: desk_core::ports::TicketStore
//! [`SessionValidator`]: desk_core::ports::SessionValidator

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
mod store;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};

/// Central database handle for all desk state.
///
/// Wraps a libSQL database and a single shared connection. Repo methods
/// run their statements under [`DeskDb::lock_conn`], so a transaction on the
/// shared connection never interleaves with another task's statements.
pub struct DeskDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    conn_gate: Mutex<()>,
}

impl DeskDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let desk_db = Self {
            db,
            conn,
            conn_gate: Mutex::new(()),
        };
        desk_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(desk_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Exclusive use of the shared connection.
    ///
    /// Hold the guard for the whole transaction, from `BEGIN` until commit
    /// or rollback. Reads take it too so they never observe an uncommitted
    /// transaction.
    pub async fn lock_conn(&self) -> MutexGuard<'_, ()> {
        self.conn_gate.lock().await
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"tkt-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Generate an opaque 32-char hex token for sessions.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_token(&self) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT lower(hex(randomblob(16)))", ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

/// Commit `tx` if `result` is `Ok`, otherwise roll it back and return the error.
pub(crate) async fn settle<T>(
    tx: libsql::Transaction,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(%rollback, %error, "rollback failed");
            }
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> DeskDb {
        DeskDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        for table in ["tickets", "ticket_messages", "sessions", "audit_trail"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn append_only_triggers_exist() {
        let db = test_db().await;
        let mut rows = db
            .conn()
            .query(
                "SELECT count(*) FROM sqlite_master WHERE type='trigger' AND tbl_name='ticket_messages'",
                (),
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 2);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("tkt").await.unwrap();
        assert!(id.starts_with("tkt-"), "ID should start with 'tkt-': {id}");
        assert_eq!(
            id.len(),
            12,
            "ID should be 12 chars (3 prefix + 1 dash + 8 hex): {id}"
        );
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_unique() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            assert!(ids.insert(db.generate_id("msg").await.unwrap()));
        }
    }

    #[tokio::test]
    async fn generate_token_is_long_hex() {
        let db = test_db().await;
        let token = db.generate_token().await.unwrap();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn open_local_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.db");
        let path = path.to_str().unwrap();
        {
            let db = DeskDb::open_local(path).await.unwrap();
            db.conn()
                .execute(
                    "INSERT INTO sessions (token, user_id, role, issued_at, expires_at)
                     VALUES ('t', 'u', 'customer', '2026-01-01T00:00:00Z', '2099-01-01T00:00:00Z')",
                    (),
                )
                .await
                .unwrap();
        }
        let db = DeskDb::open_local(path).await.unwrap();
        let mut rows = db
            .conn()
            .query("SELECT count(*) FROM sessions", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }
}
