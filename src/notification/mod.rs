//! Local notification plumbing.
//!
//! [`NotificationCenter`] is the platform's scheduler and store. The app never
//! talks to it directly; [`NotificationBridge`] wraps it and funnels both
//! delivery paths into one [`DeliveryReceiver`].

mod bridge;
mod delivery;
pub mod local_center;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::alarm::{AlarmTime, RequestId};

pub use bridge::NotificationBridge;
pub use delivery::{Delivery, DeliveryHandler, DeliveryOrigin, DeliveryReceiver, delivery_channel};
pub use local_center::LocalNotificationCenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationOptions {
    pub alert: bool,
    pub sound: bool,
    pub badge: bool,
}

impl AuthorizationOptions {
    pub fn all() -> Self {
        Self {
            alert: true,
            sound: true,
            badge: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Authorized,
}

/// Calendar trigger matching hour and minute of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarTrigger {
    pub time: AlarmTime,
    pub repeats: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    /// `None` keeps the notification silent.
    pub sound: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub identifier: RequestId,
    pub content: NotificationContent,
    pub trigger: CalendarTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredNotification {
    pub request: NotificationRequest,
    pub delivered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationResponse {
    pub notification: DeliveredNotification,
}

/// How the platform should present a notification delivered in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentationOptions {
    pub banner: bool,
    pub sound: bool,
}

impl PresentationOptions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !self.banner && !self.sound
    }
}

#[async_trait]
pub trait NotificationCenter: Send + Sync + 'static {
    async fn request_authorization(&self, options: AuthorizationOptions) -> anyhow::Result<bool>;

    async fn authorization_status(&self) -> AuthorizationStatus;

    /// Registers `request`, replacing any pending request with the same identifier.
    async fn add(&self, request: NotificationRequest) -> anyhow::Result<()>;

    async fn remove_all_pending(&self);

    async fn pending_requests(&self) -> Vec<NotificationRequest>;
}
