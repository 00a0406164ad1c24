//! Shared fixtures for gateway integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::TimeDelta;
use desk_auth::RoleAuthority;
use desk_config::{RetryConfig, TicketsConfig};
use desk_core::entities::{Message, NewMessage, NewTicket, SupportTicket};
use desk_core::enums::{Role, TicketAction, TicketStatus};
use desk_core::errors::{NotifyError, StoreError};
use desk_core::identity::Identity;
use desk_core::ports::{
    AppendOutcome, ChangeNotifier, StatusUpdate, TicketStore, TicketUpdate, ViewKey,
};
use desk_db::service::DeskService;
use desk_support::{MessageThread, ReplyGateway};

// ---------------------------------------------------------------------------
// ProbeStore: counts store calls and injects append failures
// ---------------------------------------------------------------------------

pub struct ProbeStore<S> {
    inner: S,
    calls: AtomicUsize,
    append_calls: AtomicUsize,
    failures_left: AtomicUsize,
    failure: fn(&str) -> StoreError,
}

impl<S> ProbeStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            append_calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            failure: |ticket_id| StoreError::Conflict {
                ticket_id: ticket_id.to_string(),
            },
        }
    }

    /// Fail the next `count` appends with `failure` before reaching storage.
    pub fn fail_appends(mut self, count: usize, failure: fn(&str) -> StoreError) -> Self {
        self.failures_left = AtomicUsize::new(count);
        self.failure = failure;
        self
    }

    /// Every store call of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl<S: TicketStore> TicketStore for ProbeStore<S> {
    async fn find_ticket_by_id(&self, id: &str) -> Result<Option<SupportTicket>, StoreError> {
        self.touch();
        self.inner.find_ticket_by_id(id).await
    }

    async fn find_ticket_by_id_for_creator(
        &self,
        id: &str,
        creator_id: &str,
    ) -> Result<Option<SupportTicket>, StoreError> {
        self.touch();
        self.inner.find_ticket_by_id_for_creator(id, creator_id).await
    }

    async fn append_message_and_update_ticket(
        &self,
        ticket_id: &str,
        message: &NewMessage,
        update: &TicketUpdate,
    ) -> Result<AppendOutcome, StoreError> {
        self.touch();
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            return Err((self.failure)(ticket_id));
        }
        self.inner
            .append_message_and_update_ticket(ticket_id, message, update)
            .await
    }

    async fn update_ticket_status(
        &self,
        ticket_id: &str,
        update: &StatusUpdate,
    ) -> Result<SupportTicket, StoreError> {
        self.touch();
        self.inner.update_ticket_status(ticket_id, update).await
    }

    async fn list_messages(&self, ticket_id: &str) -> Result<Vec<Message>, StoreError> {
        self.touch();
        self.inner.list_messages(ticket_id).await
    }

    async fn find_message_by_idempotency_key(
        &self,
        ticket_id: &str,
        key: &str,
    ) -> Result<Option<Message>, StoreError> {
        self.touch();
        self.inner.find_message_by_idempotency_key(ticket_id, key).await
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    batches: Mutex<Vec<BTreeSet<ViewKey>>>,
    broken: bool,
}

impl RecordingNotifier {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<BTreeSet<ViewKey>> {
        self.batches.lock().unwrap().clone()
    }
}

impl ChangeNotifier for RecordingNotifier {
    async fn invalidate(&self, keys: &BTreeSet<ViewKey>) -> Result<(), NotifyError> {
        self.batches.lock().unwrap().push(keys.clone());
        if self.broken {
            return Err(NotifyError("cache unreachable".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Desk fixture
// ---------------------------------------------------------------------------

pub type Gateway =
    ReplyGateway<Arc<ProbeStore<Arc<DeskService>>>, Arc<DeskService>, Arc<RecordingNotifier>>;

pub struct Desk {
    pub svc: Arc<DeskService>,
    pub store: Arc<ProbeStore<Arc<DeskService>>>,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<Gateway>,
}

pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        base_delay_ms: 1,
        max_delay_ms: 10,
    }
}

pub struct DeskBuilder {
    retry: RetryConfig,
    notifier: RecordingNotifier,
    probe: fn(Arc<DeskService>) -> ProbeStore<Arc<DeskService>>,
}

impl DeskBuilder {
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn notifier(mut self, notifier: RecordingNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn probe(mut self, probe: fn(Arc<DeskService>) -> ProbeStore<Arc<DeskService>>) -> Self {
        self.probe = probe;
        self
    }

    pub async fn build(self) -> Desk {
        let limits = TicketsConfig::default();
        let max_len = limits.max_message_len;
        let svc = Arc::new(DeskService::new_local(":memory:", limits).await.unwrap());
        let store = Arc::new((self.probe)(Arc::clone(&svc)));
        let notifier = Arc::new(self.notifier);
        let gateway = ReplyGateway::new(
            RoleAuthority::new(Arc::clone(&svc)),
            MessageThread::new(Arc::clone(&store), max_len),
            Arc::clone(&notifier),
            self.retry,
        );
        Desk {
            svc,
            store,
            notifier,
            gateway: Arc::new(gateway),
        }
    }
}

pub fn desk() -> DeskBuilder {
    DeskBuilder {
        retry: fast_retry(20),
        notifier: RecordingNotifier::default(),
        probe: ProbeStore::new,
    }
}

impl Desk {
    /// Issue a one-hour session and return its token.
    pub async fn login(&self, id: &str, role: Role) -> String {
        self.svc
            .issue_session(&Identity::new(id, role), TimeDelta::hours(1))
            .await
            .unwrap()
            .0
    }

    pub async fn open_ticket(&self, creator_id: &str) -> SupportTicket {
        self.svc
            .create_ticket(
                &Identity::new(creator_id, Role::Customer),
                &NewTicket {
                    title: "Package damaged".into(),
                    message: "The box arrived crushed.".into(),
                    attachment_url: None,
                },
            )
            .await
            .unwrap()
    }

    /// Drive a ticket to `status` through explicit staff actions.
    pub async fn advance_to(&self, ticket_id: &str, status: TicketStatus) -> SupportTicket {
        let staff = self.login("admin_fixture", Role::Admin).await;
        let mut ticket = self.svc.get_ticket(ticket_id).await.unwrap();
        for action in [TicketAction::Start, TicketAction::Resolve, TicketAction::Close] {
            if ticket.status == status {
                break;
            }
            ticket = self
                .gateway
                .transition(Some(&staff), ticket_id, action)
                .await
                .unwrap()
                .ticket;
        }
        assert_eq!(ticket.status, status);
        ticket
    }

    pub async fn thread(&self, ticket_id: &str) -> Vec<Message> {
        TicketStore::list_messages(&*self.svc, ticket_id).await.unwrap()
    }
}
