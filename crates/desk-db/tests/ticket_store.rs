//! Ticket store integration tests
//!
//! Exercises the public `DeskService` surface against an on-disk database:
//! - Intake, replies, and explicit status changes through the store port
//! - Persistence across reopen
//! - Audit trail contents for a full ticket lifecycle

use chrono::TimeDelta;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use desk_config::TicketsConfig;
use desk_core::entities::{NewMessage, NewTicket, StatusChange};
use desk_core::enums::{AuditAction, Role, TicketAction, TicketStatus};
use desk_core::identity::Identity;
use desk_core::ports::{SessionValidator, StatusUpdate, TicketStore, TicketUpdate};
use desk_db::repos::audit::AuditFilter;
use desk_db::repos::ticket::TicketFilter;
use desk_db::service::DeskService;

async fn on_disk(dir: &TempDir) -> DeskService {
    let path = dir.path().join("desk.db");
    DeskService::new_local(path.to_str().unwrap(), TicketsConfig::default())
        .await
        .unwrap()
}

fn new_ticket() -> NewTicket {
    NewTicket {
        title: "Wrong size delivered".into(),
        message: "Ordered M, got XL.".into(),
        attachment_url: Some("https://cdn.example.com/u/photo.jpg".into()),
    }
}

#[tokio::test]
async fn full_lifecycle_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let customer = Identity::new("user_7", Role::ProCustomer);

    let ticket_id = {
        let svc = on_disk(&dir).await;
        let ticket = svc.create_ticket(&customer, &new_ticket()).await.unwrap();

        let outcome = svc
            .append_message_and_update_ticket(
                &ticket.id,
                &NewMessage {
                    sender_id: "admin_1".into(),
                    sender_role: Role::Admin,
                    content: "Sending a replacement.".into(),
                    idempotency_key: Some("reply-1".into()),
                },
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

        let resolved = svc
            .update_ticket_status(
                &ticket.id,
                &StatusUpdate {
                    actor_id: "admin_1".into(),
                    expected_updated_at: outcome.ticket.updated_at,
                    change: StatusChange {
                        from: TicketStatus::InProgress,
                        to: TicketStatus::Resolved,
                    },
                    action: TicketAction::Resolve,
                },
            )
            .await
            .unwrap();
        assert_eq!(resolved.status, TicketStatus::Resolved);
        ticket.id
    };

    let svc = on_disk(&dir).await;
    let ticket = svc.find_ticket_by_id(&ticket_id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Resolved);
    assert_eq!(
        ticket.attachment_url.as_deref(),
        Some("https://cdn.example.com/u/photo.jpg")
    );

    let thread = TicketStore::list_messages(&svc, &ticket_id).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].sender_role, Role::Admin);
    assert_eq!(thread[0].idempotency_key.as_deref(), Some("reply-1"));

    let actions: Vec<AuditAction> = svc
        .query_audit(&AuditFilter {
            entity_id: Some(ticket_id.clone()),
            ..Default::default()
        })
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::StatusChanged,
            AuditAction::StatusChanged,
            AuditAction::MessageAdded,
            AuditAction::Created,
        ]
    );
}

#[tokio::test]
async fn sessions_survive_reopen_until_revoked() {
    let dir = TempDir::new().unwrap();
    let token = {
        let svc = on_disk(&dir).await;
        let (token, _) = svc
            .issue_session(&Identity::new("admin_1", Role::SuperAdmin), TimeDelta::hours(8))
            .await
            .unwrap();
        token
    };

    let svc = on_disk(&dir).await;
    let session = svc.validate(&token).await.unwrap().unwrap();
    assert_eq!(session.identity.role, Role::SuperAdmin);

    assert!(svc.revoke_session(&token).await.unwrap());
    assert!(svc.validate(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn creator_listing_is_scoped() {
    let dir = TempDir::new().unwrap();
    let svc = on_disk(&dir).await;
    let alice = Identity::new("alice", Role::Customer);
    let bob = Identity::new("bob", Role::User);
    svc.create_ticket(&alice, &new_ticket()).await.unwrap();
    svc.create_ticket(&bob, &new_ticket()).await.unwrap();

    let alices = svc
        .list_tickets(&TicketFilter {
            creator_id: Some("alice".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(alices.len(), 1);
    assert!(alices.iter().all(|t| t.creator_id == "alice"));
    assert!(
        svc.find_ticket_by_id_for_creator(&alices[0].id, "bob")
            .await
            .unwrap()
            .is_none()
    );
}
