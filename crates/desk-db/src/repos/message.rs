//! Message repository: the append-only thread behind each ticket.
//!
//! Messages are only ever inserted, never updated or deleted (the schema
//! enforces this with triggers). Appending a message and touching its ticket
//! happen in one transaction guarded by a compare-and-swap on the ticket's
//! `updated_at`.

use desk_core::audit_detail::{MessageAddedDetail, StatusChangedDetail};
use desk_core::entities::{AuditEntry, Message, NewMessage};
use desk_core::enums::{AuditAction, EntityType};
use desk_core::ids::{PREFIX_AUDIT, PREFIX_MESSAGE};
use desk_core::ports::{AppendOutcome, TicketUpdate};

use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, get_opt_string, next_timestamp, parse_datetime, parse_enum};
use crate::repos::audit::insert_audit;
use crate::repos::ticket::{missing_or_conflict, select_ticket};
use crate::service::DeskService;
use crate::settle;

const SELECT_COLS: &str =
    "id, ticket_id, seq, sender_id, sender_role, content, idempotency_key, created_at";

fn row_to_message(row: &libsql::Row) -> Result<Message, DatabaseError> {
    Ok(Message {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        seq: row.get(2)?,
        sender_id: row.get(3)?,
        sender_role: parse_enum(&row.get::<String>(4)?)?,
        content: row.get(5)?,
        idempotency_key: get_opt_string(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

async fn select_by_key(
    conn: &libsql::Connection,
    ticket_id: &str,
    key: &str,
) -> Result<Option<Message>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM ticket_messages WHERE ticket_id = ?1 AND idempotency_key = ?2"
            ),
            [ticket_id, key],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_message(&row)?)),
        None => Ok(None),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, DatabaseError> {
    serde_json::to_value(value).map_err(|e| DatabaseError::Other(e.into()))
}

impl DeskService {
    /// Append `message` to the ticket's thread and update the ticket, atomically.
    ///
    /// The ticket row must still carry `update.expected_updated_at` (and, for
    /// a status change, `from` as its status). Its `updated_at` is bumped to a
    /// value strictly later than before, which is also the message's
    /// `created_at`. Audit entries for the message and any status change are
    /// written in the same transaction.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::TicketNotFound` if the ticket does not exist
    /// - `DatabaseError::DuplicateKey` if the idempotency key was already used
    ///   on this ticket
    /// - `DatabaseError::Conflict` if the ticket changed since it was read
    ///
    /// Nothing is written in any of these cases.
    pub async fn append_message(
        &self,
        ticket_id: &str,
        message: &NewMessage,
        update: &TicketUpdate,
    ) -> Result<AppendOutcome, DatabaseError> {
        let created_at = next_timestamp(update.expected_updated_at);

        let _guard = self.db().lock_conn().await;
        let message_id = self.db().generate_id(PREFIX_MESSAGE).await?;
        let message_audit_id = self.db().generate_id(PREFIX_AUDIT).await?;
        let status_audit_id = match update.status_change {
            Some(_) => Some(self.db().generate_id(PREFIX_AUDIT).await?),
            None => None,
        };

        let tx = self.db().conn().transaction().await?;
        let result = async {
            if let Some(ref key) = message.idempotency_key
                && select_by_key(&tx, ticket_id, key).await?.is_some()
            {
                return Err(DatabaseError::DuplicateKey {
                    ticket_id: ticket_id.to_string(),
                    key: key.clone(),
                });
            }

            let changed = tx
                .execute(
                    "UPDATE tickets SET status = COALESCE(?1, status), updated_at = ?2
                     WHERE id = ?3 AND updated_at = ?4 AND (?5 IS NULL OR status = ?5)",
                    libsql::params![
                        update.status_change.map(|c| c.to.as_str()),
                        format_timestamp(created_at),
                        ticket_id,
                        format_timestamp(update.expected_updated_at),
                        update.status_change.map(|c| c.from.as_str())
                    ],
                )
                .await?;
            if changed == 0 {
                return Err(missing_or_conflict(&tx, ticket_id).await);
            }

            tx.execute(
                "INSERT INTO ticket_messages (id, ticket_id, sender_id, sender_role, content, idempotency_key, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    message_id.as_str(),
                    ticket_id,
                    message.sender_id.as_str(),
                    message.sender_role.as_str(),
                    message.content.as_str(),
                    message.idempotency_key.as_deref(),
                    format_timestamp(created_at)
                ],
            )
            .await?;
            let seq = tx.last_insert_rowid();

            insert_audit(
                &tx,
                &AuditEntry {
                    id: message_audit_id,
                    actor_id: message.sender_id.clone(),
                    entity_type: EntityType::Ticket,
                    entity_id: ticket_id.to_string(),
                    action: AuditAction::MessageAdded,
                    detail: Some(to_json(&MessageAddedDetail {
                        message_id: message_id.clone(),
                        seq,
                    })?),
                    created_at,
                },
            )
            .await?;
            if let (Some(change), Some(audit_id)) = (update.status_change, status_audit_id) {
                insert_audit(
                    &tx,
                    &AuditEntry {
                        id: audit_id,
                        actor_id: message.sender_id.clone(),
                        entity_type: EntityType::Ticket,
                        entity_id: ticket_id.to_string(),
                        action: AuditAction::StatusChanged,
                        detail: Some(to_json(&StatusChangedDetail {
                            from: change.from,
                            to: change.to,
                            action: None,
                        })?),
                        created_at,
                    },
                )
                .await?;
            }

            let ticket = select_ticket(&tx, ticket_id)
                .await?
                .ok_or_else(|| DatabaseError::TicketNotFound {
                    ticket_id: ticket_id.to_string(),
                })?;
            Ok(AppendOutcome {
                message: Message {
                    id: message_id.clone(),
                    ticket_id: ticket_id.to_string(),
                    seq,
                    sender_id: message.sender_id.clone(),
                    sender_role: message.sender_role,
                    content: message.content.clone(),
                    idempotency_key: message.idempotency_key.clone(),
                    created_at,
                },
                ticket,
            })
        }
        .await;
        let outcome = settle(tx, result).await?;

        tracing::debug!(
            ticket_id,
            message_id = %outcome.message.id,
            seq = outcome.message.seq,
            status = %outcome.ticket.status,
            "message appended"
        );
        Ok(outcome)
    }

    /// All messages of a ticket in append order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_messages(&self, ticket_id: &str) -> Result<Vec<Message>, DatabaseError> {
        let _guard = self.db().lock_conn().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM ticket_messages WHERE ticket_id = ?1 ORDER BY seq"
                ),
                [ticket_id],
            )
            .await?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next().await? {
            messages.push(row_to_message(&row)?);
        }
        Ok(messages)
    }

    /// Find the message previously appended to a ticket under `key`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_message_by_key(
        &self,
        ticket_id: &str,
        key: &str,
    ) -> Result<Option<Message>, DatabaseError> {
        let _guard = self.db().lock_conn().await;
        select_by_key(self.db().conn(), ticket_id, key).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use desk_core::entities::StatusChange;
    use desk_core::enums::{Role, TicketStatus};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{open_ticket, test_service};

    fn new_message(sender: &str, role: Role, content: &str, key: Option<&str>) -> NewMessage {
        NewMessage {
            sender_id: sender.into(),
            sender_role: role,
            content: content.into(),
            idempotency_key: key.map(String::from),
        }
    }

    #[tokio::test]
    async fn append_updates_ticket_and_thread() {
        let svc = test_service().await;
        let ticket = open_ticket(&svc, "user_1").await;

        let outcome = svc
            .append_message(
                &ticket.id,
                &new_message("admin_1", Role::Admin, "Looking into it", None),
                &TicketUpdate {
                    expected_updated_at: ticket.updated_at,
                    status_change: Some(StatusChange {
                        from: TicketStatus::Open,
                        to: TicketStatus::InProgress,
                    }),
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.ticket.status, TicketStatus::InProgress);
        assert!(outcome.ticket.updated_at > ticket.updated_at);
        assert_eq!(outcome.message.created_at, outcome.ticket.updated_at);

        let thread = svc.list_messages(&ticket.id).await.unwrap();
        assert_eq!(thread, vec![outcome.message]);

        let audit = svc
            .query_audit(&AuditFilter {
                entity_id: Some(ticket.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        let actions: Vec<AuditAction> = audit.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                AuditAction::StatusChanged,
                AuditAction::MessageAdded,
                AuditAction::Created
            ]
        );
    }

    #[tokio::test]
    async fn stale_expectation_writes_nothing() {
        let svc = test_service().await;
        let ticket = open_ticket(&svc, "user_1").await;

        let result = svc
            .append_message(
                &ticket.id,
                &new_message("user_1", Role::Customer, "hello?", None),
                &TicketUpdate {
                    expected_updated_at: ticket.updated_at - TimeDelta::milliseconds(5),
                    status_change: None,
                },
            )
            .await;

        assert!(matches!(result, Err(DatabaseError::Conflict { .. })));
        assert!(svc.list_messages(&ticket.id).await.unwrap().is_empty());
        assert_eq!(svc.get_ticket(&ticket.id).await.unwrap(), ticket);
    }

    #[tokio::test]
    async fn status_mismatch_is_a_conflict() {
        let svc = test_service().await;
        let ticket = open_ticket(&svc, "user_1").await;

        let result = svc
            .append_message(
                &ticket.id,
                &new_message("admin_1", Role::Admin, "hi", None),
                &TicketUpdate {
                    expected_updated_at: ticket.updated_at,
                    status_change: Some(StatusChange {
                        from: TicketStatus::InProgress,
                        to: TicketStatus::Resolved,
                    }),
                },
            )
            .await;
        assert!(matches!(result, Err(DatabaseError::Conflict { .. })));
    }

    #[tokio::test]
    async fn missing_ticket_is_not_found() {
        let svc = test_service().await;
        let result = svc
            .append_message(
                "tkt-deadbeef",
                &new_message("user_1", Role::Customer, "hi", None),
                &TicketUpdate {
                    expected_updated_at: chrono::Utc::now(),
                    status_change: None,
                },
            )
            .await;
        assert!(matches!(result, Err(DatabaseError::TicketNotFound { .. })));
    }

    #[tokio::test]
    async fn duplicate_idempotency_key_is_rejected() {
        let svc = test_service().await;
        let ticket = open_ticket(&svc, "user_1").await;
        let first = svc
            .append_message(
                &ticket.id,
                &new_message("user_1", Role::Customer, "once", Some("req-1")),
                &TicketUpdate {
                    expected_updated_at: ticket.updated_at,
                    status_change: None,
                },
            )
            .await
            .unwrap();

        let again = svc
            .append_message(
                &ticket.id,
                &new_message("user_1", Role::Customer, "once", Some("req-1")),
                &TicketUpdate {
                    expected_updated_at: first.ticket.updated_at,
                    status_change: None,
                },
            )
            .await;
        assert!(matches!(again, Err(DatabaseError::DuplicateKey { ref key, .. }) if key == "req-1"));

        let found = svc.find_message_by_key(&ticket.id, "req-1").await.unwrap();
        assert_eq!(found, Some(first.message));
        assert_eq!(svc.list_messages(&ticket.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_key_on_another_ticket_is_fine() {
        let svc = test_service().await;
        for creator in ["user_1", "user_2"] {
            let ticket = open_ticket(&svc, creator).await;
            svc.append_message(
                &ticket.id,
                &new_message(creator, Role::Customer, "hi", Some("req-1")),
                &TicketUpdate {
                    expected_updated_at: ticket.updated_at,
                    status_change: None,
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn thread_order_follows_seq() {
        let svc = test_service().await;
        let mut ticket = open_ticket(&svc, "user_1").await;
        for i in 0..5 {
            ticket = svc
                .append_message(
                    &ticket.id,
                    &new_message("user_1", Role::Customer, &format!("m{i}"), None),
                    &TicketUpdate {
                        expected_updated_at: ticket.updated_at,
                        status_change: None,
                    },
                )
                .await
                .unwrap()
                .ticket;
        }

        let thread = svc.list_messages(&ticket.id).await.unwrap();
        let contents: Vec<&str> = thread.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2", "m3", "m4"]);
        assert!(thread.windows(2).all(|w| w[0].seq < w[1].seq));
        assert!(thread.windows(2).all(|w| w[0].created_at < w[1].created_at));
    }

    #[tokio::test]
    async fn messages_cannot_be_edited_or_deleted() {
        let svc = test_service().await;
        let ticket = open_ticket(&svc, "user_1").await;
        svc.append_message(
            &ticket.id,
            &new_message("user_1", Role::Customer, "original", None),
            &TicketUpdate {
                expected_updated_at: ticket.updated_at,
                status_change: None,
            },
        )
        .await
        .unwrap();

        let conn = svc.db().conn();
        assert!(
            conn.execute("UPDATE ticket_messages SET content = 'edited'", ())
                .await
                .is_err()
        );
        assert!(conn.execute("DELETE FROM ticket_messages", ()).await.is_err());
        assert_eq!(
            svc.list_messages(&ticket.id).await.unwrap()[0].content,
            "original"
        );
    }
}
