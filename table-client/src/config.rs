//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

/// Default REST endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration
///
/// `ws_base_url` is normally derived from `base_url` (`http` becomes `ws`,
/// `https` becomes `wss`) but can be overridden when the real-time channel
/// is served from a different host.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL, no trailing slash
    pub base_url: String,
    /// Override for the real-time channel base URL
    pub ws_base_url: Option<String>,
    /// Optional bearer token, forwarded to the order-status channel
    pub token: Option<String>,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Directory for client-side persistence (guest identity)
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ws_base_url: None,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: std::env::temp_dir().join("table-client"),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_ws_base_url(mut self, ws_base_url: impl Into<String>) -> Self {
        let url: String = ws_base_url.into();
        self.ws_base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Prefix for the public (unauthenticated) REST surface
    pub fn api_prefix(&self) -> String {
        format!("{}/api/v1/public", self.base_url)
    }

    /// Base URL for real-time channels
    pub fn ws_base(&self) -> String {
        if let Some(ws) = &self.ws_base_url {
            return ws.clone();
        }
        if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        }
    }

    /// Table session event channel
    pub fn table_ws_url(&self, session_id: &str) -> String {
        format!("{}/ws/table?session_id={session_id}", self.ws_base())
    }

    /// Per-order status channel
    pub fn order_status_ws_url(&self, restaurant_id: i64, order_id: i64) -> String {
        let mut url = format!(
            "{}/ws/guest?restaurant_id={restaurant_id}&order_id={order_id}",
            self.ws_base()
        );
        if let Some(token) = &self.token {
            url.push_str("&token=");
            url.push_str(token);
        }
        url
    }
}
