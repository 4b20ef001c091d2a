//! Table Order Model

use serde::{Deserialize, Serialize};

/// Order status vocabulary shared across dine-in, pickup and delivery flows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    PendingReview,
    Accepted,
    Rejected,
    InKitchen,
    Ready,
    ReadyForPickup,
    ReadyForDelivery,
    OutForDelivery,
    Served,
    Received,
    PickedUp,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Terminal statuses; an order in one of these never moves again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Served
                | Self::Received
                | Self::PickedUp
                | Self::Delivered
                | Self::Rejected
                | Self::Cancelled
                | Self::Refunded
        )
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Pending,
    Paid,
    Refunded,
}

/// Order fulfilment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    DineIn,
    Pickup,
    Delivery,
}

/// Modifier action; controls display labeling only, never the price sign
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModifierAction {
    #[default]
    Add,
    Remove,
}

/// An add/remove option on an order item carrying a signed price delta
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemModifier {
    pub name: String,
    pub action: ModifierAction,
    /// Signed value in currency units, independent of `action`
    pub price_delta: f64,
}

/// Order item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub menu_item_id: i64,
    pub name: Option<String>,
    pub quantity: i32,
    /// Per-unit price in currency units (modifiers already applied)
    pub unit_price: f64,
    pub notes: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<ItemModifier>,
}

/// Order placed within a table session
///
/// `guest_id` is optional: orders may exist before any identity is chosen.
/// Immutable once `order_status` is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableOrder {
    pub id: i64,
    pub restaurant_id: i64,
    pub table_code: String,
    pub session_id: String,
    pub guest_id: Option<String>,
    pub guest_name: Option<String>,
    pub order_status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub order_type: OrderType,
    /// Total amount in currency units. Authoritative; never recomputed
    /// client-side from item data
    pub total_amount: f64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_at: Option<String>,
}
