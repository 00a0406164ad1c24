//! Shared test utilities for desk-db unit tests.

pub(crate) mod helpers {
    use desk_config::TicketsConfig;
    use desk_core::entities::{NewMessage, NewTicket, SupportTicket};
    use desk_core::enums::{ActorKind, Role};
    use desk_core::identity::Identity;
    use desk_core::lifecycle::reply_transition;
    use desk_core::ports::TicketUpdate;

    use crate::DeskDb;
    use crate::service::DeskService;

    /// Create an in-memory `DeskService` with default limits.
    pub async fn test_service() -> DeskService {
        let db = DeskDb::open_local(":memory:").await.unwrap();
        DeskService::from_db(db, TicketsConfig::default())
    }

    pub fn customer(id: &str) -> Identity {
        Identity::new(id, Role::Customer)
    }

    pub fn staff(id: &str) -> Identity {
        Identity::new(id, Role::Admin)
    }

    /// Open a ticket as a customer with placeholder content.
    pub async fn open_ticket(svc: &DeskService, creator_id: &str) -> SupportTicket {
        svc.create_ticket(
            &customer(creator_id),
            &NewTicket {
                title: "Order never arrived".into(),
                message: "Placed order #1042 two weeks ago.".into(),
                attachment_url: None,
            },
        )
        .await
        .unwrap()
    }

    /// Append a reply the way the gateway would, applying the reply rule.
    pub async fn reply(
        svc: &DeskService,
        ticket_id: &str,
        sender: &Identity,
        content: &str,
    ) -> SupportTicket {
        let ticket = svc.get_ticket(ticket_id).await.unwrap();
        let actor = if sender.is_staff() {
            ActorKind::Staff
        } else {
            ActorKind::Creator
        };
        let status_change = reply_transition(ticket.status, actor).unwrap();
        svc.append_message(
            ticket_id,
            &NewMessage {
                sender_id: sender.id.clone(),
                sender_role: sender.role,
                content: content.into(),
                idempotency_key: None,
            },
            &TicketUpdate {
                expected_updated_at: ticket.updated_at,
                status_change,
            },
        )
        .await
        .unwrap()
        .ticket
    }
}
