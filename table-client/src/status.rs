//! Per-order status tracking with degraded fallback
//!
//! Each tracked order holds its own status channel. While the channel is
//! healthy, server frames are authoritative. When the channel degrades,
//! a timer walks the expected timeline for the order's fulfilment type
//! one step per interval, so the diner still sees plausible progress.
//! Any real frame abandons the fallback immediately.

use std::sync::Arc;
use std::time::Duration;

use shared::extract_status;
use shared::models::{OrderStatus, OrderType};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::transport::{Transport, WsTransport};

/// Interval between synthetic fallback advances
pub const FALLBACK_STEP_INTERVAL: Duration = Duration::from_secs(60);

const DINE_IN_STEPS: &[OrderStatus] = &[
    OrderStatus::PendingReview,
    OrderStatus::Accepted,
    OrderStatus::InKitchen,
    OrderStatus::Ready,
    OrderStatus::Served,
];

const PICKUP_STEPS: &[OrderStatus] = &[
    OrderStatus::PendingReview,
    OrderStatus::Accepted,
    OrderStatus::InKitchen,
    OrderStatus::ReadyForPickup,
    OrderStatus::PickedUp,
];

const DELIVERY_STEPS: &[OrderStatus] = &[
    OrderStatus::PendingReview,
    OrderStatus::Accepted,
    OrderStatus::InKitchen,
    OrderStatus::ReadyForDelivery,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
];

/// Expected status timeline for a fulfilment type
pub fn steps_for(order_type: OrderType) -> &'static [OrderStatus] {
    match order_type {
        OrderType::DineIn => DINE_IN_STEPS,
        OrderType::Pickup => PICKUP_STEPS,
        OrderType::Delivery => DELIVERY_STEPS,
    }
}

/// Statuses that mean the same progress point across fulfilment types
fn equivalent(a: OrderStatus, b: OrderStatus) -> bool {
    const READY_LIKE: [OrderStatus; 3] = [
        OrderStatus::Ready,
        OrderStatus::ReadyForPickup,
        OrderStatus::ReadyForDelivery,
    ];
    const HANDED_OVER: [OrderStatus; 4] = [
        OrderStatus::Served,
        OrderStatus::Received,
        OrderStatus::PickedUp,
        OrderStatus::Delivered,
    ];

    (READY_LIKE.contains(&a) && READY_LIKE.contains(&b))
        || (HANDED_OVER.contains(&a) && HANDED_OVER.contains(&b))
}

/// Position of a status on a fulfilment type's timeline.
///
/// Statuses from a sibling flow map through their equivalence class, so
/// a `ready` frame still lands on `ready_for_pickup` for a pickup order.
pub fn step_index(order_type: OrderType, status: OrderStatus) -> Option<usize> {
    steps_for(order_type)
        .iter()
        .position(|step| *step == status || equivalent(*step, status))
}

/// Live status view of one order
pub struct OrderStatusTracker {
    rx: watch::Receiver<OrderStatus>,
    cancel: CancellationToken,
    transport: Arc<dyn Transport>,
}

impl OrderStatusTracker {
    /// Track an order over an already-connected transport
    pub fn start(
        order_type: OrderType,
        initial: OrderStatus,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let (tx, rx) = watch::channel(initial);
        let cancel = CancellationToken::new();

        tokio::spawn(run(
            tx,
            transport.clone(),
            order_type,
            cancel.clone(),
        ));

        Self {
            rx,
            cancel,
            transport,
        }
    }

    /// Connect to the order's status channel and track it
    pub async fn connect(
        config: &ClientConfig,
        restaurant_id: i64,
        order_id: i64,
        order_type: OrderType,
        initial: OrderStatus,
    ) -> ClientResult<Self> {
        let url = config.order_status_ws_url(restaurant_id, order_id);
        let transport: Arc<dyn Transport> = Arc::new(WsTransport::connect(&url).await?);
        Ok(Self::start(order_type, initial, transport))
    }

    /// Current status
    pub fn status(&self) -> OrderStatus {
        *self.rx.borrow()
    }

    /// Receiver for status changes
    pub fn watch(&self) -> watch::Receiver<OrderStatus> {
        self.rx.clone()
    }

    /// Stop tracking and close the channel; pending fallback timers die
    /// with the task.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.transport.close().await;
    }
}

impl Drop for OrderStatusTracker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    tx: watch::Sender<OrderStatus>,
    transport: Arc<dyn Transport>,
    order_type: OrderType,
    cancel: CancellationToken,
) {
    let steps = steps_for(order_type);
    let mut fallback: Option<tokio::time::Interval> = None;
    let mut channel_open = true;

    loop {
        if !channel_open && fallback.is_none() {
            return;
        }

        tokio::select! {
            _ = cancel.cancelled() => return,

            // Synthetic advance while the channel is degraded
            _ = async { fallback.as_mut().expect("guarded by branch condition").tick().await },
                if fallback.is_some() =>
            {
                let current = *tx.borrow();
                let next_idx = match step_index(order_type, current) {
                    Some(i) => (i + 1).min(steps.len() - 1),
                    None => 0,
                };
                let next = steps[next_idx];
                if next != current {
                    tracing::debug!(?current, ?next, "fallback status advance");
                    tx.send_replace(next);
                }
                if next_idx == steps.len() - 1 {
                    fallback = None;
                }
            }

            read = transport.read_text(), if channel_open => match read {
                Some(Ok(text)) => {
                    // A live frame is authoritative; drop any fallback
                    fallback = None;
                    if let Some(status) = extract_status(&text) {
                        tx.send_replace(status);
                    }
                }
                Some(Err(e)) => {
                    tracing::debug!("status channel degraded: {e}");
                    if fallback.is_none() && !tx.borrow().is_terminal() {
                        fallback = Some(new_fallback_timer().await);
                    }
                }
                None => {
                    tracing::debug!("status channel closed");
                    channel_open = false;
                    if fallback.is_none() && !tx.borrow().is_terminal() {
                        fallback = Some(new_fallback_timer().await);
                    }
                }
            }
        }
    }
}

async fn new_fallback_timer() -> tokio::time::Interval {
    let mut interval = tokio::time::interval(FALLBACK_STEP_INTERVAL);
    interval.tick().await; // skip immediate tick
    interval
}
