//! Table channel event envelope
//!
//! Messages on the table real-time channel carry a `{type, payload}`
//! envelope. Order mutation payloads are kept opaque on purpose: consumers
//! refetch the authoritative order list instead of patching payloads in,
//! so whichever of event and fetch completes last is still correct.

use serde::{Deserialize, Serialize};

use crate::models::{OrderStatus, SessionGuest};

/// Event envelope on the table real-time channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum TableEvent {
    /// A guest joined the session
    #[serde(rename = "guest.joined")]
    GuestJoined(SessionGuest),

    /// A guest left the session
    #[serde(rename = "guest.left")]
    GuestLeft { guest_id: String },

    /// An order was created; payload is opaque, consumers refetch
    #[serde(rename = "table.order.created")]
    OrderCreated(serde_json::Value),

    /// An order was updated; payload is opaque, consumers refetch
    #[serde(rename = "table.order.updated")]
    OrderUpdated(serde_json::Value),
}

impl TableEvent {
    /// Parse a raw text frame; unknown event types and malformed frames
    /// return `None` and are dropped by the caller.
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str(text) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!("Ignoring unrecognized table event: {e}");
                None
            }
        }
    }

    /// True for events that invalidate the cached order list
    pub fn is_order_mutation(&self) -> bool {
        matches!(self, Self::OrderCreated(_) | Self::OrderUpdated(_))
    }
}

/// Normalize an order-status frame.
///
/// The status channel is tolerant of two shapes: `{"payload":{"status":..}}`
/// and a flat `{"status":..}`. This is the single normalization boundary;
/// consumers never inspect raw frames themselves.
pub fn extract_status(text: &str) -> Option<OrderStatus> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let status = value
        .get("payload")
        .and_then(|p| p.get("status"))
        .or_else(|| value.get("status"))?;
    serde_json::from_value(status.clone()).ok()
}
