//! Transient libSQL error detection.
//!
//! Lock contention on the database file surfaces as `SQLITE_BUSY` or
//! `SQLITE_LOCKED` and resolves on its own once the other writer finishes.
//! Those errors map to `StoreError::Transient` so the reply gateway retries
//! them with the configured backoff (`desk_config::RetryConfig`).

/// Detect transient lock-contention errors.
///
/// The predicate is intentionally narrow to avoid retrying genuine
/// SQL or constraint errors.
pub fn is_transient_libsql_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("SQLITE_BUSY")
        || msg.contains("SQLITE_LOCKED")
}
