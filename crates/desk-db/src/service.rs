//! Service layer orchestrating database mutations with audit.
//!
//! `DeskService` wraps `DeskDb` (raw database access) and the ticket content
//! limits. All repo methods are implemented as `impl DeskService` blocks in
//! [`crate::repos`]; the port implementations live in the private `store`
//! module.

use desk_config::TicketsConfig;

use crate::DeskDb;
use crate::error::DatabaseError;

/// Orchestrates database mutations with an audit trail.
///
/// Every mutation method follows this protocol:
/// 1. Take the write lock
/// 2. Begin transaction
/// 3. Execute SQL (compare-and-swap on `tickets.updated_at` where a ticket changes)
/// 4. Append audit entries (inside transaction)
/// 5. Commit, or roll back on any error
pub struct DeskService {
    db: DeskDb,
    limits: TicketsConfig,
}

impl DeskService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `limits` - Title and message length limits applied at intake.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str, limits: TicketsConfig) -> Result<Self, DatabaseError> {
        let db = DeskDb::open_local(db_path).await?;
        Ok(Self { db, limits })
    }

    /// Create from an existing `DeskDb` (for testing).
    #[must_use]
    pub const fn from_db(db: DeskDb, limits: TicketsConfig) -> Self {
        Self { db, limits }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &DeskDb {
        &self.db
    }

    /// Content limits applied to new tickets.
    #[must_use]
    pub const fn limits(&self) -> &TicketsConfig {
        &self.limits
    }
}
