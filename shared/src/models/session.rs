//! Table Session Model

use serde::{Deserialize, Serialize};

/// Session status as reported by the server
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    #[default]
    Expired,
}

/// One participant identity within a table session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionGuest {
    pub id: String,
    pub session_id: String,
    pub display_name: String,
    pub avatar_emoji: String,
    pub created_at: String,
}

/// Shared ephemeral ordering context bound to one physical table
///
/// Created when a table QR is scanned; destroyed/expired by the backend
/// on timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSession {
    pub id: String,
    pub restaurant_id: i64,
    pub table_code: String,
    pub status: SessionStatus,
    pub expires_at: String,
    #[serde(default)]
    pub guests: Vec<SessionGuest>,
}

/// Client-persisted guest identity, scoped by session id
///
/// Valid only while `guest_id` appears in the latest server guest list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredIdentity {
    pub guest_id: String,
    pub display_name: String,
    pub avatar_emoji: String,
}
