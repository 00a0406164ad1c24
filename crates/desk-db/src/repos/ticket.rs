//! Ticket repository: intake, lookups, listings, and explicit status changes.

use desk_core::audit_detail::StatusChangedDetail;
use desk_core::entities::{AuditEntry, NewTicket, SupportTicket};
use desk_core::enums::{AuditAction, EntityType, Role, TicketStatus};
use desk_core::identity::Identity;
use desk_core::ids::{PREFIX_AUDIT, PREFIX_TICKET};
use desk_core::ports::StatusUpdate;
use desk_core::validation::validate_text;

use crate::error::DatabaseError;
use crate::helpers::{
    format_timestamp, get_opt_string, next_timestamp, now_micros, parse_datetime, parse_enum,
};
use crate::repos::audit::insert_audit;
use crate::service::DeskService;
use crate::settle;

pub(crate) const SELECT_COLS: &str =
    "id, creator_id, title, message, attachment_url, status, created_at, updated_at";

pub(crate) fn row_to_ticket(row: &libsql::Row) -> Result<SupportTicket, DatabaseError> {
    Ok(SupportTicket {
        id: row.get(0)?,
        creator_id: row.get(1)?,
        title: row.get(2)?,
        message: row.get(3)?,
        attachment_url: get_opt_string(row, 4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Read a ticket on `conn`, which may be an open transaction.
pub(crate) async fn select_ticket(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<SupportTicket>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM tickets WHERE id = ?1"),
            [id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_ticket(&row)?)),
        None => Ok(None),
    }
}

/// Quoted, comma-separated storage names of the staff roles.
fn staff_roles_sql() -> String {
    Role::ALL
        .into_iter()
        .filter(|role| role.is_staff())
        .map(|role| format!("'{}'", role.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Filter criteria for ticket listings.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Restrict to tickets opened by this user.
    pub creator_id: Option<String>,
    pub status: Option<TicketStatus>,
    pub limit: Option<u32>,
}

impl DeskService {
    /// Open a new ticket on behalf of `creator`.
    ///
    /// Title and message are validated against the configured limits and
    /// stored verbatim. A blank attachment URL is stored as absent.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for bad input, or `DatabaseError`
    /// if the INSERT fails.
    pub async fn create_ticket(
        &self,
        creator: &Identity,
        new: &NewTicket,
    ) -> Result<SupportTicket, DatabaseError> {
        validate_text("title", &new.title, self.limits().max_title_len)?;
        validate_text("message", &new.message, self.limits().max_message_len)?;

        let _guard = self.db().lock_conn().await;
        let id = self.db().generate_id(PREFIX_TICKET).await?;
        let audit_id = self.db().generate_id(PREFIX_AUDIT).await?;
        let now = now_micros();
        let ticket = SupportTicket {
            id,
            creator_id: creator.id.clone(),
            title: new.title.clone(),
            message: new.message.clone(),
            attachment_url: new
                .attachment_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(String::from),
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        };

        let tx = self.db().conn().transaction().await?;
        let result = async {
            tx.execute(
                "INSERT INTO tickets (id, creator_id, title, message, attachment_url, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    ticket.id.as_str(),
                    ticket.creator_id.as_str(),
                    ticket.title.as_str(),
                    ticket.message.as_str(),
                    ticket.attachment_url.as_deref(),
                    ticket.status.as_str(),
                    format_timestamp(now),
                    format_timestamp(now)
                ],
            )
            .await?;
            insert_audit(
                &tx,
                &AuditEntry {
                    id: audit_id,
                    actor_id: creator.id.clone(),
                    entity_type: EntityType::Ticket,
                    entity_id: ticket.id.clone(),
                    action: AuditAction::Created,
                    detail: None,
                    created_at: now,
                },
            )
            .await
        }
        .await;
        settle(tx, result).await?;

        tracing::info!(ticket_id = %ticket.id, creator_id = %ticket.creator_id, "ticket opened");
        Ok(ticket)
    }

    /// Fetch a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::TicketNotFound` if no such ticket exists.
    pub async fn get_ticket(&self, id: &str) -> Result<SupportTicket, DatabaseError> {
        self.find_ticket(id)
            .await?
            .ok_or_else(|| DatabaseError::TicketNotFound {
                ticket_id: id.to_string(),
            })
    }

    /// Fetch a ticket by ID, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_ticket(&self, id: &str) -> Result<Option<SupportTicket>, DatabaseError> {
        let _guard = self.db().lock_conn().await;
        select_ticket(self.db().conn(), id).await
    }

    /// Fetch a ticket only if it was opened by `creator_id`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_ticket_for_creator(
        &self,
        id: &str,
        creator_id: &str,
    ) -> Result<Option<SupportTicket>, DatabaseError> {
        let _guard = self.db().lock_conn().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM tickets WHERE id = ?1 AND creator_id = ?2"),
                [id, creator_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_ticket(&row)?)),
            None => Ok(None),
        }
    }

    /// List tickets, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_tickets(
        &self,
        filter: &TicketFilter,
    ) -> Result<Vec<SupportTicket>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref creator_id) = filter.creator_id {
            params.push(libsql::Value::Text(creator_id.clone()));
            conditions.push(format!("creator_id = ?{}", params.len()));
        }
        if let Some(status) = filter.status {
            params.push(libsql::Value::Text(status.as_str().to_string()));
            conditions.push(format!("status = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM tickets {where_clause}
             ORDER BY updated_at DESC, rowid DESC LIMIT {limit}"
        );

        let _guard = self.db().lock_conn().await;
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut tickets = Vec::new();
        while let Some(row) = rows.next().await? {
            tickets.push(row_to_ticket(&row)?);
        }
        Ok(tickets)
    }

    /// Active tickets whose latest message did not come from staff.
    ///
    /// A ticket with no replies yet counts as waiting. Ordered by how long the
    /// customer has been waiting: since their latest message, or since the
    /// ticket was opened. Explicit staff actions do not reorder the queue.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_awaiting_staff(
        &self,
        limit: u32,
    ) -> Result<Vec<SupportTicket>, DatabaseError> {
        let staff_roles = staff_roles_sql();
        let cols = SELECT_COLS
            .split(", ")
            .map(|col| format!("t.{col}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {cols} FROM tickets t
             LEFT JOIN ticket_messages m
               ON m.seq = (SELECT MAX(seq) FROM ticket_messages WHERE ticket_id = t.id)
             WHERE t.status IN ('open', 'in_progress')
               AND (m.seq IS NULL OR m.sender_role NOT IN ({staff_roles}))
             ORDER BY COALESCE(m.created_at, t.created_at) ASC, t.rowid ASC LIMIT {limit}"
        );

        let _guard = self.db().lock_conn().await;
        let mut rows = self.db().conn().query(&sql, ()).await?;
        let mut tickets = Vec::new();
        while let Some(row) = rows.next().await? {
            tickets.push(row_to_ticket(&row)?);
        }
        Ok(tickets)
    }

    /// Apply an explicit status change if the ticket is unchanged since
    /// `update.expected_updated_at`.
    ///
    /// Writes a `status_changed` audit entry in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::TicketNotFound` if the ticket is gone, or
    /// `DatabaseError::Conflict` if it changed since it was read.
    pub async fn apply_status_update(
        &self,
        ticket_id: &str,
        update: &StatusUpdate,
    ) -> Result<SupportTicket, DatabaseError> {
        let updated_at = next_timestamp(update.expected_updated_at);

        let _guard = self.db().lock_conn().await;
        let audit_id = self.db().generate_id(PREFIX_AUDIT).await?;
        let tx = self.db().conn().transaction().await?;
        let result = async {
            let changed = tx
                .execute(
                    "UPDATE tickets SET status = ?1, updated_at = ?2
                     WHERE id = ?3 AND updated_at = ?4 AND status = ?5",
                    libsql::params![
                        update.change.to.as_str(),
                        format_timestamp(updated_at),
                        ticket_id,
                        format_timestamp(update.expected_updated_at),
                        update.change.from.as_str()
                    ],
                )
                .await?;
            if changed == 0 {
                return Err(missing_or_conflict(&tx, ticket_id).await);
            }

            let detail = StatusChangedDetail {
                from: update.change.from,
                to: update.change.to,
                action: Some(update.action),
            };
            insert_audit(
                &tx,
                &AuditEntry {
                    id: audit_id,
                    actor_id: update.actor_id.clone(),
                    entity_type: EntityType::Ticket,
                    entity_id: ticket_id.to_string(),
                    action: AuditAction::StatusChanged,
                    detail: Some(
                        serde_json::to_value(&detail).map_err(|e| DatabaseError::Other(e.into()))?,
                    ),
                    created_at: updated_at,
                },
            )
            .await?;

            select_ticket(&tx, ticket_id)
                .await?
                .ok_or_else(|| DatabaseError::TicketNotFound {
                    ticket_id: ticket_id.to_string(),
                })
        }
        .await;
        let ticket = settle(tx, result).await?;

        tracing::info!(
            ticket_id,
            from = %update.change.from,
            to = %update.change.to,
            action = %update.action,
            "ticket status changed"
        );
        Ok(ticket)
    }
}

/// After a compare-and-swap UPDATE touched no rows, tell a vanished ticket
/// apart from a concurrent modification.
pub(crate) async fn missing_or_conflict(
    conn: &libsql::Connection,
    ticket_id: &str,
) -> DatabaseError {
    match select_ticket(conn, ticket_id).await {
        Ok(Some(_)) => DatabaseError::Conflict {
            ticket_id: ticket_id.to_string(),
        },
        Ok(None) => DatabaseError::TicketNotFound {
            ticket_id: ticket_id.to_string(),
        },
        Err(error) => error,
    }
}
