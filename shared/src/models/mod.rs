//! Data models

mod order;
mod session;

pub use order::{
    ItemModifier, ModifierAction, OrderItem, OrderStatus, OrderType, PaymentStatus, TableOrder,
};
pub use session::{SessionGuest, SessionStatus, StoredIdentity, TableSession};
