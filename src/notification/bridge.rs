use std::sync::Arc;

use crate::{
    alarm::{AlarmRequest, AlarmTime, RequestId},
    error::AlarmError,
};

use super::{
    AuthorizationOptions, AuthorizationStatus, CalendarTrigger, NotificationCenter,
    NotificationContent, NotificationRequest,
};

const DEFAULT_TITLE: &str = "GetUpPlease";
const DEFAULT_BODY: &str = "Time to wake up!";

pub struct NotificationBridge {
    center: Arc<dyn NotificationCenter>,
    title: String,
    body: String,
}

impl NotificationBridge {
    pub fn new(center: Arc<dyn NotificationCenter>) -> Self {
        Self::with_content(center, DEFAULT_TITLE, DEFAULT_BODY)
    }

    pub fn with_content(
        center: Arc<dyn NotificationCenter>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            center,
            title: title.into(),
            body: body.into(),
        }
    }

    pub async fn request_authorization(&self) -> anyhow::Result<bool> {
        let granted = self
            .center
            .request_authorization(AuthorizationOptions::all())
            .await?;

        if granted {
            log::info!("Notification authorization granted");
        } else {
            log::warn!("Notification authorization denied, alarms cannot be armed");
        }

        Ok(granted)
    }

    /// Registers the one-shot alarm notification for the next `fire_time`,
    /// replacing whatever was pending under the alarm identifier.
    pub async fn schedule(&self, fire_time: AlarmTime) -> Result<RequestId, AlarmError> {
        if self.center.authorization_status().await != AuthorizationStatus::Authorized {
            return Err(AlarmError::PermissionDenied);
        }

        let alarm = AlarmRequest::new(fire_time);
        let request = NotificationRequest {
            identifier: alarm.identifier.clone(),
            content: NotificationContent {
                title: self.title.clone(),
                body: self.body.clone(),
                sound: None,
            },
            trigger: CalendarTrigger {
                time: alarm.fire_time,
                repeats: false,
            },
        };

        self.center
            .add(request)
            .await
            .map_err(AlarmError::SchedulingFailed)?;

        log::info!(
            "Registered notification {} for {}",
            alarm.identifier,
            alarm.fire_time
        );

        Ok(alarm.identifier)
    }

    pub async fn cancel_all(&self) {
        self.center.remove_all_pending().await;
    }

    pub async fn pending_requests(&self) -> Vec<NotificationRequest> {
        self.center.pending_requests().await
    }
}
