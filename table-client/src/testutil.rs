//! Shared test doubles for the sync engine

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shared::models::{
    OrderStatus, OrderType, PaymentStatus, SessionGuest, SessionStatus, TableOrder, TableSession,
};
use tokio::sync::Mutex;

use crate::api::{PushSubscriptionRequest, PushUnsubscribeRequest, RestApi};
use crate::error::{ClientError, ClientResult};
use crate::transport::{Transport, TransportFactory};

// ============================================================================
// Scripted transport
// ============================================================================

/// One scripted step on a fake channel
pub(crate) enum Frame {
    Text(String),
    Error(String),
    Close,
    Wait(Duration),
}

/// Transport that replays a fixed script, then blocks forever
pub(crate) struct ScriptedTransport {
    frames: Mutex<VecDeque<Frame>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport").finish()
    }
}

impl ScriptedTransport {
    pub(crate) fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: Mutex::new(frames.into()),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn read_text(&self) -> Option<ClientResult<String>> {
        loop {
            // Yield like a real socket read so consumers observe each
            // frame instead of seeing coalesced watch updates.
            tokio::task::yield_now().await;
            let frame = self.frames.lock().await.pop_front();
            match frame {
                Some(Frame::Text(text)) => return Some(Ok(text)),
                Some(Frame::Error(e)) => return Some(Err(ClientError::Connection(e))),
                Some(Frame::Close) => return None,
                Some(Frame::Wait(d)) => tokio::time::sleep(d).await,
                None => futures::future::pending::<()>().await,
            }
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Factory handing out pre-built transports, one per connect call
pub(crate) struct ScriptedConnector {
    transports: Mutex<VecDeque<Arc<dyn Transport>>>,
    connects: AtomicUsize,
}

impl ScriptedConnector {
    pub(crate) fn new(transports: Vec<Arc<dyn Transport>>) -> Self {
        Self {
            transports: Mutex::new(transports.into()),
            connects: AtomicUsize::new(0),
        }
    }

    pub(crate) fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportFactory for ScriptedConnector {
    async fn connect(&self, _session_id: &str) -> ClientResult<Arc<dyn Transport>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.transports
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| ClientError::Connection("no transport scripted".to_string()))
    }
}

// ============================================================================
// In-memory REST stub
// ============================================================================

/// In-memory [`RestApi`] stub with mutable server-side state
pub(crate) struct StubApi {
    pub(crate) session: Mutex<TableSession>,
    pub(crate) orders: Mutex<Vec<TableOrder>>,
    pub(crate) session_fetches: AtomicUsize,
    pub(crate) order_fetches: AtomicUsize,
    pub(crate) leaves: AtomicUsize,
    pub(crate) fail_orders: AtomicBool,
    pub(crate) public_key: Mutex<Option<String>>,
    pub(crate) push_registrations: Mutex<Vec<PushSubscriptionRequest>>,
    pub(crate) push_removals: Mutex<Vec<PushUnsubscribeRequest>>,
}

impl StubApi {
    pub(crate) fn new(session: TableSession) -> Self {
        Self {
            session: Mutex::new(session),
            orders: Mutex::new(Vec::new()),
            session_fetches: AtomicUsize::new(0),
            order_fetches: AtomicUsize::new(0),
            leaves: AtomicUsize::new(0),
            fail_orders: AtomicBool::new(false),
            public_key: Mutex::new(Some("test-vapid-key".to_string())),
            push_registrations: Mutex::new(Vec::new()),
            push_removals: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RestApi for StubApi {
    async fn fetch_session(&self, session_id: &str) -> ClientResult<TableSession> {
        self.session_fetches.fetch_add(1, Ordering::SeqCst);
        let session = self.session.lock().await.clone();
        if session.id != session_id {
            return Err(ClientError::NotFound(format!(
                "session {session_id} not found"
            )));
        }
        Ok(session)
    }

    async fn fetch_session_orders(&self, _session_id: &str) -> ClientResult<Vec<TableOrder>> {
        self.order_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(ClientError::Internal("orders unavailable".to_string()));
        }
        Ok(self.orders.lock().await.clone())
    }

    async fn join_session(
        &self,
        session_id: &str,
        display_name: &str,
        avatar_emoji: &str,
    ) -> ClientResult<SessionGuest> {
        let mut session = self.session.lock().await;
        let guest = SessionGuest {
            id: format!("g-{}", session.guests.len() + 1),
            session_id: session_id.to_string(),
            display_name: display_name.to_string(),
            avatar_emoji: avatar_emoji.to_string(),
            created_at: "2026-08-01T12:00:00Z".to_string(),
        };
        session.guests.push(guest.clone());
        Ok(guest)
    }

    async fn leave_session(&self, _session_id: &str, guest_id: &str) -> ClientResult<()> {
        self.leaves.fetch_add(1, Ordering::SeqCst);
        let mut session = self.session.lock().await;
        session.guests.retain(|g| g.id != guest_id);
        Ok(())
    }

    async fn push_public_key(&self) -> ClientResult<Option<String>> {
        Ok(self.public_key.lock().await.clone())
    }

    async fn register_push_subscription(
        &self,
        request: &PushSubscriptionRequest,
    ) -> ClientResult<()> {
        self.push_registrations.lock().await.push(request.clone());
        Ok(())
    }

    async fn remove_push_subscription(
        &self,
        request: &PushUnsubscribeRequest,
    ) -> ClientResult<()> {
        self.push_removals.lock().await.push(request.clone());
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub(crate) fn active_session(id: &str) -> TableSession {
    TableSession {
        id: id.to_string(),
        restaurant_id: 7,
        table_code: "T1".to_string(),
        status: SessionStatus::Active,
        expires_at: "2026-08-01T14:00:00Z".to_string(),
        guests: Vec::new(),
    }
}

pub(crate) fn guest(id: &str, session_id: &str, name: &str) -> SessionGuest {
    SessionGuest {
        id: id.to_string(),
        session_id: session_id.to_string(),
        display_name: name.to_string(),
        avatar_emoji: "🦊".to_string(),
        created_at: "2026-08-01T12:00:00Z".to_string(),
    }
}

pub(crate) fn order(id: i64, session_id: &str, guest_id: Option<&str>, total: f64) -> TableOrder {
    TableOrder {
        id,
        restaurant_id: 7,
        table_code: "T1".to_string(),
        session_id: session_id.to_string(),
        guest_id: guest_id.map(str::to_string),
        guest_name: None,
        order_status: OrderStatus::PendingReview,
        payment_status: PaymentStatus::Unpaid,
        order_type: OrderType::DineIn,
        total_amount: total,
        items: Vec::new(),
        created_at: None,
    }
}
