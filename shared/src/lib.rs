//! Shared types for the table-session sync engine
//!
//! Wire-level data model and event envelope types used by the client
//! engine and by any in-process test harness standing in for the server.

pub mod events;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Event re-exports (for convenient access)
pub use events::{TableEvent, extract_status};
