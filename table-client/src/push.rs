//! Push subscription lifecycle for order notifications
//!
//! The platform side (permission prompts, the actual push service
//! subscription) is behind `PushPlatform` so the manager's state machine
//! is testable without a device. Server registration is best-effort: a
//! device-level subscription without a server record still counts as
//! subscribed and re-registers on the next init.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{PushSubscriptionRequest, PushUnsubscribeRequest, RestApi};
use crate::error::ClientResult;

/// Notification permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// Not asked yet
    Default,
    Granted,
    Denied,
}

/// Device push credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

/// Platform push capabilities
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Whether this device can deliver push notifications at all
    fn is_supported(&self) -> bool;

    /// Current permission without prompting
    fn permission(&self) -> PermissionState;

    /// Prompt the user; resolves to the resulting permission
    async fn request_permission(&self) -> PermissionState;

    /// Existing device subscription, if one survives from a prior visit
    async fn current_subscription(&self) -> Option<DeviceSubscription>;

    /// Create a device subscription against the given server key
    async fn subscribe(&self, server_key: &str) -> ClientResult<DeviceSubscription>;

    /// Drop the device subscription
    async fn unsubscribe(&self) -> ClientResult<()>;
}

/// Manager lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushState {
    #[default]
    Idle,
    Subscribing,
    Subscribed,
    Denied,
    Unsupported,
}

/// Drives the push subscription for one order
pub struct PushSubscriptionManager {
    api: Arc<dyn RestApi>,
    platform: Arc<dyn PushPlatform>,
    order_id: i64,
    restaurant_id: i64,
    state: PushState,
    subscription: Option<DeviceSubscription>,
    last_error: Option<String>,
}

impl PushSubscriptionManager {
    pub fn new(
        api: Arc<dyn RestApi>,
        platform: Arc<dyn PushPlatform>,
        restaurant_id: i64,
        order_id: i64,
    ) -> Self {
        Self {
            api,
            platform,
            order_id,
            restaurant_id,
            state: PushState::Idle,
            subscription: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> PushState {
        self.state
    }

    pub fn is_subscribed(&self) -> bool {
        self.state == PushState::Subscribed
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Establish the starting state: unsupported and denied are sticky,
    /// an existing device subscription is adopted and re-registered with
    /// the server in case its record was lost.
    pub async fn init(&mut self) {
        if !self.platform.is_supported() {
            self.state = PushState::Unsupported;
            return;
        }
        if self.platform.permission() == PermissionState::Denied {
            self.state = PushState::Denied;
            return;
        }

        if let Some(existing) = self.platform.current_subscription().await {
            if let Err(e) = self.register(&existing).await {
                tracing::warn!(order_id = self.order_id, "push re-registration failed: {e}");
            }
            self.subscription = Some(existing);
            self.state = PushState::Subscribed;
        }
    }

    /// Subscribe this device to updates for the order.
    ///
    /// Never prompts again after an explicit denial; the platform's
    /// `Denied` report short-circuits before any prompt.
    pub async fn subscribe(&mut self) {
        if self.state == PushState::Unsupported || self.state == PushState::Subscribed {
            return;
        }
        self.state = PushState::Subscribing;
        self.last_error = None;

        let key = match self.api.push_public_key().await {
            Ok(Some(key)) => key,
            Ok(None) => {
                self.last_error = Some("push notifications not configured on server".to_string());
                self.state = PushState::Idle;
                return;
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.state = PushState::Idle;
                return;
            }
        };

        let permission = match self.platform.permission() {
            PermissionState::Granted => PermissionState::Granted,
            PermissionState::Denied => {
                self.state = PushState::Denied;
                return;
            }
            PermissionState::Default => self.platform.request_permission().await,
        };
        if permission != PermissionState::Granted {
            self.state = PushState::Denied;
            return;
        }

        match self.platform.subscribe(&key).await {
            Ok(subscription) => {
                if let Err(e) = self.register(&subscription).await {
                    // Device subscription exists; server catches up on next init
                    tracing::warn!(order_id = self.order_id, "push registration failed: {e}");
                }
                self.subscription = Some(subscription);
                self.state = PushState::Subscribed;
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.state = PushState::Idle;
            }
        }
    }

    /// Drop the subscription on the device and the server
    pub async fn unsubscribe(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            return;
        };

        if let Err(e) = self.platform.unsubscribe().await {
            tracing::warn!(order_id = self.order_id, "device unsubscribe failed: {e}");
        }
        self.state = PushState::Idle;

        let request = PushUnsubscribeRequest {
            order_id: self.order_id,
            endpoint: subscription.endpoint,
        };
        if let Err(e) = self.api.remove_push_subscription(&request).await {
            tracing::warn!(order_id = self.order_id, "server unsubscribe failed: {e}");
        }
    }

    async fn register(&self, subscription: &DeviceSubscription) -> ClientResult<()> {
        let request = PushSubscriptionRequest {
            order_id: self.order_id,
            restaurant_id: self.restaurant_id,
            endpoint: subscription.endpoint.clone(),
            p256dh: subscription.p256dh.clone(),
            auth: subscription.auth.clone(),
        };
        self.api.register_push_subscription(&request).await
    }
}
