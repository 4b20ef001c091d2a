//! Shared table session state
//!
//! `SessionStore` owns everything a device needs while sitting at a
//! table: the session snapshot, the live guest list, the order list and
//! the persisted guest identity. Events patch the guest list in place;
//! order events only invalidate, the authoritative list is always
//! refetched. Event application is last-write-wins and tolerates
//! duplicate or out-of-order delivery.

use std::sync::Arc;
use std::time::Duration;

use shared::TableEvent;
use shared::models::{
    PaymentStatus, SessionGuest, SessionStatus, StoredIdentity, TableOrder,
};
use tokio::sync::{Mutex, RwLock, mpsc};

use crate::api::{HttpApi, RestApi};
use crate::config::ClientConfig;
use crate::connection::{ConnectionSignal, SessionConnection};
use crate::error::{ClientError, ClientResult};
use crate::identity::IdentityStore;
use crate::pricing;
use crate::transport::{TransportFactory, WsConnector};

/// Delay before re-initializing after an unexpected channel drop
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Pool of avatars assigned to guests who do not pick one
const AVATAR_EMOJIS: &[&str] = &[
    "🦊", "🐼", "🐸", "🐙", "🦁", "🐯", "🐨", "🐻", "🐷", "🐵", "🦄", "🐲", "🐳", "🦉", "🦜", "🐝",
];

/// Local lifecycle of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreStatus {
    #[default]
    Idle,
    Loading,
    Active,
    Expired,
    Error,
}

#[derive(Default)]
struct SessionState {
    session_id: Option<String>,
    table_code: Option<String>,
    restaurant_id: Option<i64>,
    status: StoreStatus,
    identity: Option<StoredIdentity>,
    guests: Vec<SessionGuest>,
    orders: Vec<TableOrder>,
}

struct StoreInner {
    api: Arc<dyn RestApi>,
    identity: IdentityStore,
    connector: Arc<dyn TransportFactory>,
    state: RwLock<SessionState>,
    connection: Mutex<Option<SessionConnection>>,
}

/// Clonable handle to the shared session state
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_parts(
            Arc::new(HttpApi::new(config)),
            IdentityStore::new(&config.data_dir),
            Arc::new(WsConnector::new(config.clone())),
        )
    }

    /// Assemble a store from explicit parts; tests inject stubs here
    pub fn with_parts(
        api: Arc<dyn RestApi>,
        identity: IdentityStore,
        connector: Arc<dyn TransportFactory>,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                api,
                identity,
                connector,
                state: RwLock::new(SessionState::default()),
                connection: Mutex::new(None),
            }),
        }
    }

    /// Load a session, reconcile identity and start the event channel.
    ///
    /// Calling again with the id of the already-active session is a no-op,
    /// so concurrent callers cannot double-connect.
    pub async fn initialize(&self, session_id: &str) -> ClientResult<()> {
        {
            let state = self.inner.state.read().await;
            if state.status == StoreStatus::Active
                && state.session_id.as_deref() == Some(session_id)
            {
                tracing::debug!(session_id, "session already active, skipping initialize");
                return Ok(());
            }
        }

        {
            let mut state = self.inner.state.write().await;
            state.session_id = Some(session_id.to_string());
            state.status = StoreStatus::Loading;
        }

        self.load_and_connect(session_id).await
    }

    async fn load_and_connect(&self, session_id: &str) -> ClientResult<()> {
        let session = match self.inner.api.fetch_session(session_id).await {
            Ok(session) => session,
            Err(e) => {
                self.set_status(StoreStatus::Error).await;
                return Err(e);
            }
        };

        // An expired session renders read-only; no orders, no channel
        if session.status != SessionStatus::Active {
            tracing::info!(session_id, "session expired");
            let mut state = self.inner.state.write().await;
            state.status = StoreStatus::Expired;
            state.table_code = Some(session.table_code);
            state.restaurant_id = Some(session.restaurant_id);
            state.guests = session.guests;
            state.orders.clear();
            return Ok(());
        }

        let orders = match self.inner.api.fetch_session_orders(session_id).await {
            Ok(orders) => orders,
            Err(e) => {
                self.set_status(StoreStatus::Error).await;
                return Err(e);
            }
        };

        // A persisted identity is only valid while the server still lists
        // the guest; anything else is discarded and the user rejoins.
        let identity = match self.inner.identity.load(session_id) {
            Some(identity) if session.guests.iter().any(|g| g.id == identity.guest_id) => {
                Some(identity)
            }
            Some(stale) => {
                tracing::info!(
                    session_id,
                    guest_id = %stale.guest_id,
                    "stored identity missing from guest list, discarding"
                );
                if let Err(e) = self.inner.identity.clear(session_id) {
                    tracing::warn!("failed to clear stale identity: {e}");
                }
                None
            }
            None => None,
        };

        {
            let mut state = self.inner.state.write().await;
            state.session_id = Some(session_id.to_string());
            state.table_code = Some(session.table_code.clone());
            state.restaurant_id = Some(session.restaurant_id);
            state.guests = session.guests;
            state.orders = orders;
            state.identity = identity;
            state.status = StoreStatus::Active;
        }

        self.connect(session_id).await;
        Ok(())
    }

    async fn connect(&self, session_id: &str) {
        // Replace any previous connection silently
        if let Some(old) = self.inner.connection.lock().await.take() {
            old.disconnect().await;
        }

        match self.inner.connector.connect(session_id).await {
            Ok(transport) => {
                let (connection, rx) = SessionConnection::start(session_id, transport);
                *self.inner.connection.lock().await = Some(connection);

                let store = self.clone();
                let session_id = session_id.to_string();
                tokio::spawn(async move { store.drive(session_id, rx).await });
            }
            Err(e) => {
                tracing::warn!(session_id, "event channel connect failed, will retry: {e}");
                self.schedule_reconnect(session_id.to_string());
            }
        }
    }

    async fn drive(self, session_id: String, mut rx: mpsc::UnboundedReceiver<ConnectionSignal>) {
        while let Some(signal) = rx.recv().await {
            match signal {
                ConnectionSignal::Event(event) => self.apply_event(event).await,
                ConnectionSignal::Dropped => {
                    self.schedule_reconnect(session_id);
                    return;
                }
            }
        }
    }

    /// One delayed re-initialize per drop, skipped if the session moved
    /// on or expired in the meantime.
    fn schedule_reconnect(&self, session_id: String) {
        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(RECONNECT_DELAY).await;

            let still_active = {
                let state = store.inner.state.read().await;
                state.status == StoreStatus::Active
                    && state.session_id.as_deref() == Some(session_id.as_str())
            };
            if !still_active {
                return;
            }

            tracing::info!(session_id, "event channel dropped, re-initializing");
            {
                let mut state = store.inner.state.write().await;
                state.status = StoreStatus::Loading;
            }
            if let Err(e) = store.load_and_connect(&session_id).await {
                tracing::warn!(session_id, "reconnect failed: {e}");
            }
        });
    }

    async fn apply_event(&self, event: TableEvent) {
        match event {
            TableEvent::GuestJoined(guest) => {
                let mut state = self.inner.state.write().await;
                if state.guests.iter().all(|g| g.id != guest.id) {
                    state.guests.push(guest);
                }
            }
            TableEvent::GuestLeft { guest_id } => {
                let mut state = self.inner.state.write().await;
                state.guests.retain(|g| g.id != guest_id);
            }
            TableEvent::OrderCreated(_) | TableEvent::OrderUpdated(_) => {
                if let Err(e) = self.refresh_orders().await {
                    tracing::debug!("order refresh after event failed: {e}");
                }
            }
        }
    }

    /// Refetch the authoritative order list
    pub async fn refresh_orders(&self) -> ClientResult<()> {
        let Some(session_id) = self.session_id().await else {
            return Ok(());
        };
        let orders = self.inner.api.fetch_session_orders(&session_id).await?;
        self.inner.state.write().await.orders = orders;
        Ok(())
    }

    /// Register a guest identity in the active session and persist it.
    ///
    /// Picks a random avatar when the caller does not supply one.
    pub async fn join(
        &self,
        display_name: &str,
        avatar_emoji: Option<&str>,
    ) -> ClientResult<SessionGuest> {
        let session_id = {
            let state = self.inner.state.read().await;
            match (&state.status, &state.session_id) {
                (StoreStatus::Active, Some(id)) => id.clone(),
                _ => {
                    return Err(ClientError::Validation(
                        "no active session to join".to_string(),
                    ));
                }
            }
        };

        let emoji = avatar_emoji
            .map(str::to_string)
            .unwrap_or_else(random_avatar_emoji);
        let guest = self
            .inner
            .api
            .join_session(&session_id, display_name, &emoji)
            .await?;

        let identity = StoredIdentity {
            guest_id: guest.id.clone(),
            display_name: guest.display_name.clone(),
            avatar_emoji: guest.avatar_emoji.clone(),
        };
        // Persistence failure downgrades to a per-visit identity
        if let Err(e) = self.inner.identity.store(&session_id, identity.clone()) {
            tracing::warn!("failed to persist guest identity: {e}");
        }

        {
            let mut state = self.inner.state.write().await;
            state.guests.retain(|g| g.id != guest.id);
            state.guests.push(guest.clone());
            state.identity = Some(identity);
        }

        Ok(guest)
    }

    /// Leave the session and close the event channel.
    ///
    /// Server removal is best-effort; local identity clears regardless,
    /// and the closure never schedules a reconnect.
    pub async fn leave(&self) {
        let (session_id, identity) = {
            let state = self.inner.state.read().await;
            (state.session_id.clone(), state.identity.clone())
        };
        let (Some(session_id), Some(identity)) = (session_id, identity) else {
            return;
        };

        if let Err(e) = self
            .inner
            .api
            .leave_session(&session_id, &identity.guest_id)
            .await
        {
            tracing::debug!("leave request failed: {e}");
        }
        if let Err(e) = self.inner.identity.clear(&session_id) {
            tracing::debug!("identity clear failed: {e}");
        }

        {
            let mut state = self.inner.state.write().await;
            state.identity = None;
            state.guests.retain(|g| g.id != identity.guest_id);
        }

        self.disconnect().await;
    }

    /// Close the event channel without touching session state
    pub async fn disconnect(&self) {
        if let Some(connection) = self.inner.connection.lock().await.take() {
            connection.disconnect().await;
        }
    }

    async fn set_status(&self, status: StoreStatus) {
        self.inner.state.write().await.status = status;
    }

    // Views

    pub async fn status(&self) -> StoreStatus {
        self.inner.state.read().await.status
    }

    pub async fn session_id(&self) -> Option<String> {
        self.inner.state.read().await.session_id.clone()
    }

    pub async fn table_code(&self) -> Option<String> {
        self.inner.state.read().await.table_code.clone()
    }

    pub async fn restaurant_id(&self) -> Option<i64> {
        self.inner.state.read().await.restaurant_id
    }

    pub async fn guests(&self) -> Vec<SessionGuest> {
        self.inner.state.read().await.guests.clone()
    }

    pub async fn orders(&self) -> Vec<TableOrder> {
        self.inner.state.read().await.orders.clone()
    }

    pub async fn identity(&self) -> Option<StoredIdentity> {
        self.inner.state.read().await.identity.clone()
    }

    /// Sum of all order totals at the table
    pub async fn total_table_amount(&self) -> f64 {
        let state = self.inner.state.read().await;
        pricing::to_f64(pricing::sum_order_totals(&state.orders))
    }

    /// Orders attributed to the stored identity; all orders when no
    /// identity has been chosen yet.
    pub async fn my_orders(&self) -> Vec<TableOrder> {
        let state = self.inner.state.read().await;
        match &state.identity {
            Some(identity) => state
                .orders
                .iter()
                .filter(|o| o.guest_id.as_deref() == Some(identity.guest_id.as_str()))
                .cloned()
                .collect(),
            None => state.orders.clone(),
        }
    }

    /// Unpaid share of [`my_orders`](Self::my_orders)
    pub async fn my_unpaid_total(&self) -> f64 {
        let state = self.inner.state.read().await;
        let mine = state.orders.iter().filter(|o| {
            o.payment_status == PaymentStatus::Unpaid
                && match &state.identity {
                    Some(identity) => o.guest_id.as_deref() == Some(identity.guest_id.as_str()),
                    None => true,
                }
        });
        pricing::to_f64(pricing::sum_order_totals(mine))
    }
}

fn random_avatar_emoji() -> String {
    use rand::seq::SliceRandom;
    AVATAR_EMOJIS
        .choose(&mut rand::thread_rng())
        .unwrap_or(&AVATAR_EMOJIS[0])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        Frame, ScriptedConnector, ScriptedTransport, StubApi, active_session, guest, order,
    };
    use crate::transport::{MemoryConnector, Transport};
    use std::sync::atomic::Ordering;
    use tokio::sync::broadcast;

    fn store_with(
        api: Arc<StubApi>,
        connector: Arc<dyn TransportFactory>,
        dir: &std::path::Path,
    ) -> SessionStore {
        SessionStore::with_parts(api, IdentityStore::new(dir), connector)
    }

    fn pending_connector() -> Arc<ScriptedConnector> {
        Arc::new(ScriptedConnector::new(vec![Arc::new(
            ScriptedTransport::new(vec![]),
        )]))
    }

    fn guest_joined_frame(id: &str, session_id: &str) -> String {
        format!(
            r#"{{"type":"guest.joined","payload":{{"id":"{id}","session_id":"{session_id}","display_name":"Eli","avatar_emoji":"🐼","created_at":"2026-08-01T12:05:00Z"}}}}"#
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_loads_session_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        api.orders.lock().await.push(order(1, "sess-1", Some("g-1"), 12.5));
        let connector = pending_connector();
        let store = store_with(api.clone(), connector.clone(), dir.path());

        store.initialize("sess-1").await.unwrap();

        assert_eq!(store.status().await, StoreStatus::Active);
        assert_eq!(store.table_code().await.as_deref(), Some("T1"));
        assert_eq!(store.restaurant_id().await, Some(7));
        assert_eq!(store.orders().await.len(), 1);
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_same_active_session_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        let connector = pending_connector();
        let store = store_with(api.clone(), connector.clone(), dir.path());

        store.initialize("sess-1").await.unwrap();
        store.initialize("sess-1").await.unwrap();

        assert_eq!(api.session_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = active_session("sess-1");
        session.status = SessionStatus::Expired;
        let api = Arc::new(StubApi::new(session));
        let connector = pending_connector();
        let store = store_with(api.clone(), connector.clone(), dir.path());

        store.initialize("sess-1").await.unwrap();

        assert_eq!(store.status().await, StoreStatus::Expired);
        assert_eq!(api.order_fetches.load(Ordering::SeqCst), 0);
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_fetch_failure_sets_error() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        api.fail_orders.store(true, Ordering::SeqCst);
        let store = store_with(api, pending_connector(), dir.path());

        assert!(store.initialize("sess-1").await.is_err());
        assert_eq!(store.status().await, StoreStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_identity_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let identity_store = IdentityStore::new(dir.path());
        identity_store
            .store(
                "sess-1",
                StoredIdentity {
                    guest_id: "g-gone".to_string(),
                    display_name: "Old".to_string(),
                    avatar_emoji: "🐸".to_string(),
                },
            )
            .unwrap();

        let mut session = active_session("sess-1");
        session.guests.push(guest("g-1", "sess-1", "Dana"));
        let api = Arc::new(StubApi::new(session));
        let store = store_with(api, pending_connector(), dir.path());

        store.initialize("sess-1").await.unwrap();

        assert!(store.identity().await.is_none());
        assert!(identity_store.load("sess-1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_identity_is_restored() {
        let dir = tempfile::tempdir().unwrap();
        IdentityStore::new(dir.path())
            .store(
                "sess-1",
                StoredIdentity {
                    guest_id: "g-1".to_string(),
                    display_name: "Dana".to_string(),
                    avatar_emoji: "🦊".to_string(),
                },
            )
            .unwrap();

        let mut session = active_session("sess-1");
        session.guests.push(guest("g-1", "sess-1", "Dana"));
        let api = Arc::new(StubApi::new(session));
        let store = store_with(api, pending_connector(), dir.path());

        store.initialize("sess-1").await.unwrap();

        assert_eq!(store.identity().await.unwrap().guest_id, "g-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_guest_joined_adds_once() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        let (tx, _keep) = broadcast::channel(16);
        let store = store_with(
            api,
            Arc::new(MemoryConnector::new(tx.clone())),
            dir.path(),
        );

        store.initialize("sess-1").await.unwrap();

        tx.send(guest_joined_frame("g-2", "sess-1")).unwrap();
        tx.send(guest_joined_frame("g-2", "sess-1")).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let guests = store.guests().await;
        assert_eq!(guests.len(), 1);
        assert_eq!(guests[0].id, "g-2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_guest_left_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = active_session("sess-1");
        session.guests.push(guest("g-1", "sess-1", "Dana"));
        let api = Arc::new(StubApi::new(session));
        let (tx, _keep) = broadcast::channel(16);
        let store = store_with(
            api,
            Arc::new(MemoryConnector::new(tx.clone())),
            dir.path(),
        );

        store.initialize("sess-1").await.unwrap();
        tx.send(r#"{"type":"guest.left","payload":{"guest_id":"g-1"}}"#.to_string())
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(store.guests().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_event_triggers_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        let (tx, _keep) = broadcast::channel(16);
        let store = store_with(
            api.clone(),
            Arc::new(MemoryConnector::new(tx.clone())),
            dir.path(),
        );

        store.initialize("sess-1").await.unwrap();
        assert!(store.orders().await.is_empty());

        api.orders.lock().await.push(order(1, "sess-1", None, 9.0));
        tx.send(r#"{"type":"table.order.created","payload":{"id":1}}"#.to_string())
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.orders().await.len(), 1);
        assert_eq!(api.order_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_drop_triggers_one_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        let connector = Arc::new(ScriptedConnector::new(vec![
            Arc::new(ScriptedTransport::new(vec![Frame::Close])) as Arc<dyn Transport>,
            Arc::new(ScriptedTransport::new(vec![])) as Arc<dyn Transport>,
        ]));
        let store = store_with(api.clone(), connector.clone(), dir.path());

        store.initialize("sess-1").await.unwrap();
        tokio::time::sleep(RECONNECT_DELAY + Duration::from_secs(1)).await;

        assert_eq!(connector.connect_count(), 2);
        assert_eq!(api.session_fetches.load(Ordering::SeqCst), 2);
        assert_eq!(store.status().await, StoreStatus::Active);

        // No further reconnect attempts while the second channel is healthy
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(connector.connect_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_persists_identity_and_dedups_guest() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        let store = store_with(api, pending_connector(), dir.path());

        store.initialize("sess-1").await.unwrap();
        let joined = store.join("Dana", Some("🦊")).await.unwrap();

        assert_eq!(store.identity().await.unwrap().guest_id, joined.id);
        assert_eq!(store.guests().await.len(), 1);
        assert_eq!(
            IdentityStore::new(dir.path()).load("sess-1").unwrap().guest_id,
            joined.id
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_picks_avatar_when_unspecified() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        let store = store_with(api, pending_connector(), dir.path());

        store.initialize("sess-1").await.unwrap();
        let joined = store.join("Dana", None).await.unwrap();

        assert!(AVATAR_EMOJIS.contains(&joined.avatar_emoji.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_requires_active_session() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        let store = store_with(api, pending_connector(), dir.path());

        assert!(matches!(
            store.join("Dana", None).await,
            Err(ClientError::Validation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_leave_clears_identity_and_never_reconnects() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        let (tx, _keep) = broadcast::channel(16);
        let store = store_with(
            api.clone(),
            Arc::new(MemoryConnector::new(tx.clone())),
            dir.path(),
        );

        store.initialize("sess-1").await.unwrap();
        store.join("Dana", Some("🦊")).await.unwrap();
        store.leave().await;

        assert!(store.identity().await.is_none());
        assert_eq!(api.leaves.load(Ordering::SeqCst), 1);
        assert!(IdentityStore::new(dir.path()).load("sess-1").is_none());

        // The channel closes as part of leaving; no reconnect may follow
        drop(tx);
        tokio::time::sleep(RECONNECT_DELAY * 4).await;
        assert_eq!(api.session_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_totals_and_my_orders_views() {
        let dir = tempfile::tempdir().unwrap();
        IdentityStore::new(dir.path())
            .store(
                "sess-1",
                StoredIdentity {
                    guest_id: "g-1".to_string(),
                    display_name: "Dana".to_string(),
                    avatar_emoji: "🦊".to_string(),
                },
            )
            .unwrap();

        let mut session = active_session("sess-1");
        session.guests.push(guest("g-1", "sess-1", "Dana"));
        let api = Arc::new(StubApi::new(session));
        {
            let mut orders = api.orders.lock().await;
            orders.push(order(1, "sess-1", Some("g-1"), 10.0));
            let mut paid = order(2, "sess-1", Some("g-1"), 5.5);
            paid.payment_status = PaymentStatus::Paid;
            orders.push(paid);
            orders.push(order(3, "sess-1", Some("g-2"), 7.0));
        }
        let store = store_with(api, pending_connector(), dir.path());

        store.initialize("sess-1").await.unwrap();

        assert_eq!(store.total_table_amount().await, 22.5);
        assert_eq!(store.my_orders().await.len(), 2);
        assert_eq!(store.my_unpaid_total().await, 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_views_without_identity_cover_whole_table() {
        let dir = tempfile::tempdir().unwrap();
        let api = Arc::new(StubApi::new(active_session("sess-1")));
        {
            let mut orders = api.orders.lock().await;
            orders.push(order(1, "sess-1", Some("g-1"), 10.0));
            orders.push(order(2, "sess-1", Some("g-2"), 7.0));
        }
        let store = store_with(api, pending_connector(), dir.path());

        store.initialize("sess-1").await.unwrap();

        assert_eq!(store.my_orders().await.len(), 2);
        assert_eq!(store.my_unpaid_total().await, 17.0);
    }
}
