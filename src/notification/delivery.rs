use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::alarm::RequestId;

use super::{DeliveredNotification, NotificationResponse, PresentationOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOrigin {
    /// Delivered while the app was the active foreground context.
    Foreground,
    /// The user opened the delivered notification while the app was backgrounded.
    Interaction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub request_id: RequestId,
    pub origin: DeliveryOrigin,
    pub delivered_at: DateTime<Utc>,
}

pub type DeliveryReceiver = mpsc::UnboundedReceiver<Delivery>;

/// Platform-facing end of the delivery stream. Cheap to clone and safe to call
/// from any thread; events are only consumed by whoever owns the receiver.
#[derive(Debug, Clone)]
pub struct DeliveryHandler {
    sender: mpsc::UnboundedSender<Delivery>,
}

pub fn delivery_channel() -> (DeliveryHandler, DeliveryReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (DeliveryHandler { sender }, receiver)
}

impl DeliveryHandler {
    /// Foreground delivery. The app shows its own alarm screen, so the platform
    /// banner is always suppressed.
    pub fn will_present(&self, notification: &DeliveredNotification) -> PresentationOptions {
        self.forward(notification, DeliveryOrigin::Foreground);
        PresentationOptions::none()
    }

    pub fn did_receive(&self, response: &NotificationResponse) {
        self.forward(&response.notification, DeliveryOrigin::Interaction);
    }

    fn forward(&self, notification: &DeliveredNotification, origin: DeliveryOrigin) {
        let request_id = &notification.request.identifier;
        if !request_id.is_alarm() {
            log::debug!("Ignoring delivery for foreign notification {request_id}");
            return;
        }

        let delivery = Delivery {
            request_id: request_id.clone(),
            origin,
            delivered_at: notification.delivered_at,
        };

        if self.sender.send(delivery).is_err() {
            log::warn!("Alarm delivery dropped, nobody is listening. [origin = {origin:?}]");
        }
    }
}
