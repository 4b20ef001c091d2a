//! Table session synchronization engine
//!
//! Client-side engine for shared-table ordering: one QR scan opens a
//! session, several phones join it, and everyone sees the same guest
//! list, orders and totals. REST carries the authoritative state,
//! a WebSocket channel carries invalidations and guest events, and a
//! per-order channel tracks kitchen progress with a degraded fallback.

pub mod api;
pub mod config;
pub mod connection;
pub mod error;
pub mod identity;
pub mod pricing;
pub mod push;
pub mod split;
pub mod status;
pub mod store;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

pub use api::{HttpApi, PushSubscriptionRequest, PushUnsubscribeRequest, RestApi};
pub use config::ClientConfig;
pub use connection::{ConnectionSignal, SessionConnection};
pub use error::{ClientError, ClientResult};
pub use identity::IdentityStore;
pub use push::{
    DeviceSubscription, PermissionState, PushPlatform, PushState, PushSubscriptionManager,
};
pub use split::{SplitMode, SplitQuote, SplitSelection, TIP_PERCENT_OPTIONS};
pub use status::{FALLBACK_STEP_INTERVAL, OrderStatusTracker, step_index, steps_for};
pub use store::{RECONNECT_DELAY, SessionStore, StoreStatus};
pub use transport::{
    MemoryConnector, MemoryTransport, Transport, TransportFactory, WsConnector, WsTransport,
};

// Re-export the wire models alongside the engine
pub use shared::models;
pub use shared::{TableEvent, extract_status};
