//! Public REST surface
//!
//! The session endpoints are unauthenticated; the session id itself is the
//! capability. `RestApi` is a trait so the store and the push manager can
//! be driven by a stub in tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::models::{SessionGuest, TableOrder, TableSession};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Device push credentials registered for one order
#[derive(Debug, Clone, Serialize)]
pub struct PushSubscriptionRequest {
    pub order_id: i64,
    pub restaurant_id: i64,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

/// Push registration removal, keyed by order and device endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PushUnsubscribeRequest {
    pub order_id: i64,
    pub endpoint: String,
}

/// REST operations used by the sync engine
#[async_trait]
pub trait RestApi: Send + Sync {
    /// Fetch a session with its guest list
    async fn fetch_session(&self, session_id: &str) -> ClientResult<TableSession>;

    /// Fetch all orders placed within a session
    async fn fetch_session_orders(&self, session_id: &str) -> ClientResult<Vec<TableOrder>>;

    /// Register a guest identity in a session
    async fn join_session(
        &self,
        session_id: &str,
        display_name: &str,
        avatar_emoji: &str,
    ) -> ClientResult<SessionGuest>;

    /// Remove a guest identity from a session
    async fn leave_session(&self, session_id: &str, guest_id: &str) -> ClientResult<()>;

    /// Server VAPID public key; `None` when push is not configured
    async fn push_public_key(&self) -> ClientResult<Option<String>>;

    /// Register device push credentials for an order
    async fn register_push_subscription(
        &self,
        request: &PushSubscriptionRequest,
    ) -> ClientResult<()>;

    /// Remove a device push registration
    async fn remove_push_subscription(
        &self,
        request: &PushUnsubscribeRequest,
    ) -> ClientResult<()>;
}

// Response envelopes

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    session: TableSession,
}

#[derive(Debug, Deserialize)]
struct GuestEnvelope {
    guest: SessionGuest,
}

#[derive(Debug, Deserialize)]
struct OrdersEnvelope {
    #[serde(default)]
    orders: Vec<TableOrder>,
}

#[derive(Debug, Deserialize)]
struct PublicKeyEnvelope {
    public_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct JoinRequest<'a> {
    display_name: &'a str,
    avatar_emoji: &'a str,
}

/// HTTP implementation of [`RestApi`]
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    prefix: String,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            prefix: config.api_prefix(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}{}", self.prefix, path);
        let resp = self.client.get(&url).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let url = format!("{}{}", self.prefix, path);
        let resp = self.client.post(&url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn post_no_content<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<()> {
        let url = format!("{}{}", self.prefix, path);
        let resp = self.client.post(&url).json(body).send().await?;
        Self::check_status(resp).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let url = format!("{}{}", self.prefix, path);
        let resp = self.client.delete(&url).send().await?;
        Self::check_status(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
        let status = resp.status();

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::status_error(status, text));
        }

        resp.json().await.map_err(Into::into)
    }

    async fn check_status(resp: reqwest::Response) -> ClientResult<()> {
        let status = resp.status();

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::status_error(status, text));
        }

        Ok(())
    }

    fn status_error(status: StatusCode, text: String) -> ClientError {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST => ClientError::Validation(text),
            _ => ClientError::Internal(text),
        }
    }
}

#[async_trait]
impl RestApi for HttpApi {
    async fn fetch_session(&self, session_id: &str) -> ClientResult<TableSession> {
        let resp: SessionEnvelope = self.get(&format!("/table-sessions/{session_id}")).await?;
        Ok(resp.session)
    }

    async fn fetch_session_orders(&self, session_id: &str) -> ClientResult<Vec<TableOrder>> {
        let resp: OrdersEnvelope = self
            .get(&format!("/table-sessions/{session_id}/orders"))
            .await?;
        Ok(resp.orders)
    }

    async fn join_session(
        &self,
        session_id: &str,
        display_name: &str,
        avatar_emoji: &str,
    ) -> ClientResult<SessionGuest> {
        let body = JoinRequest {
            display_name,
            avatar_emoji,
        };
        let resp: GuestEnvelope = self
            .post(&format!("/table-sessions/{session_id}/guests"), &body)
            .await?;
        Ok(resp.guest)
    }

    async fn leave_session(&self, session_id: &str, guest_id: &str) -> ClientResult<()> {
        self.delete(&format!("/table-sessions/{session_id}/guests/{guest_id}"))
            .await
    }

    async fn push_public_key(&self) -> ClientResult<Option<String>> {
        let resp: PublicKeyEnvelope = self.get("/push/public-key").await?;
        Ok(resp.public_key)
    }

    async fn register_push_subscription(
        &self,
        request: &PushSubscriptionRequest,
    ) -> ClientResult<()> {
        self.post_no_content("/push/subscriptions", request).await
    }

    async fn remove_push_subscription(
        &self,
        request: &PushUnsubscribeRequest,
    ) -> ClientResult<()> {
        self.post_no_content("/push/subscriptions/delete", request)
            .await
    }
}
