//! `TicketStore` and `SessionValidator` on top of `DeskService`.

use chrono::Utc;

use desk_core::entities::{Message, NewMessage, SupportTicket};
use desk_core::errors::StoreError;
use desk_core::identity::Session;
use desk_core::ports::{AppendOutcome, SessionValidator, StatusUpdate, TicketStore, TicketUpdate};

use crate::service::DeskService;

impl TicketStore for DeskService {
    async fn find_ticket_by_id(&self, id: &str) -> Result<Option<SupportTicket>, StoreError> {
        Ok(self.find_ticket(id).await?)
    }

    async fn find_ticket_by_id_for_creator(
        &self,
        id: &str,
        creator_id: &str,
    ) -> Result<Option<SupportTicket>, StoreError> {
        Ok(self.find_ticket_for_creator(id, creator_id).await?)
    }

    async fn append_message_and_update_ticket(
        &self,
        ticket_id: &str,
        message: &NewMessage,
        update: &TicketUpdate,
    ) -> Result<AppendOutcome, StoreError> {
        Ok(self.append_message(ticket_id, message, update).await?)
    }

    async fn update_ticket_status(
        &self,
        ticket_id: &str,
        update: &StatusUpdate,
    ) -> Result<SupportTicket, StoreError> {
        Ok(self.apply_status_update(ticket_id, update).await?)
    }

    async fn list_messages(&self, ticket_id: &str) -> Result<Vec<Message>, StoreError> {
        Ok(Self::list_messages(self, ticket_id).await?)
    }

    async fn find_message_by_idempotency_key(
        &self,
        ticket_id: &str,
        key: &str,
    ) -> Result<Option<Message>, StoreError> {
        Ok(self.find_message_by_key(ticket_id, key).await?)
    }
}

impl SessionValidator for DeskService {
    async fn validate(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.find_live_session(token, Utc::now()).await?)
    }
}
