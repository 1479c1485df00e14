//! In-process stand-in for the platform notification scheduler.
//!
//! Each pending request owns a timer task that sleeps until the next
//! occurrence of its calendar trigger in the configured timezone, removes the
//! request from the store and hands the delivery to the [`DeliveryHandler`]:
//! through `will_present` while the app is in the foreground, through
//! `did_receive` otherwise (the user opening the delivered notification).

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::{
    sync::RwLock,
    task::{self, JoinHandle},
};

use crate::alarm::RequestId;

use super::{
    AuthorizationOptions, AuthorizationStatus, DeliveredNotification, DeliveryHandler,
    NotificationCenter, NotificationRequest, NotificationResponse,
};

struct PendingNotification {
    request: NotificationRequest,
    task: JoinHandle<()>,
}

type PendingStore = RwLock<HashMap<RequestId, PendingNotification>>;

pub struct LocalNotificationCenter {
    pending: Arc<PendingStore>,
    delivery_handler: DeliveryHandler,
    timezone: Tz,
    grant_authorization: bool,
    authorization: RwLock<AuthorizationStatus>,
    foreground: Arc<AtomicBool>,
}

impl LocalNotificationCenter {
    pub fn new(delivery_handler: DeliveryHandler, timezone: Tz, grant_authorization: bool) -> Self {
        Self {
            pending: Arc::new(RwLock::new(HashMap::new())),
            delivery_handler,
            timezone,
            grant_authorization,
            authorization: RwLock::new(AuthorizationStatus::NotDetermined),
            foreground: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Marks whether the app is the active foreground context. Decides which
    /// delivery path a firing notification takes.
    pub fn set_foreground(&self, foreground: bool) {
        self.foreground.store(foreground, Ordering::SeqCst);
    }

    fn spawn_delivery_task(&self, request: NotificationRequest) -> anyhow::Result<JoinHandle<()>> {
        let now = Utc::now().with_timezone(&self.timezone);
        let fire_at = next_occurrence(request.trigger.time.time(), &now);
        let delay = fire_at.signed_duration_since(&now).to_std()?;

        log::info!(
            "[SCHEDULE] Sleeping for {:?} delay. Identifier {}, fires at {}",
            delay,
            request.identifier,
            fire_at
        );

        let pending = Arc::clone(&self.pending);
        let foreground = Arc::clone(&self.foreground);
        let handler = self.delivery_handler.clone();

        Ok(task::spawn(async move {
            tokio::time::sleep(delay).await;

            // One-shot trigger: the request leaves the store once delivered.
            pending.write().await.remove(&request.identifier);

            let notification = DeliveredNotification {
                request,
                delivered_at: Utc::now(),
            };

            if foreground.load(Ordering::SeqCst) {
                let options = handler.will_present(&notification);
                if !options.is_empty() {
                    log::info!("Presenting system banner for {}", notification.request.identifier);
                }
            } else {
                log::info!(
                    "User opened delivered notification {}",
                    notification.request.identifier
                );
                handler.did_receive(&NotificationResponse { notification });
            }
        }))
    }
}

impl Drop for LocalNotificationCenter {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.try_write() {
            for (_, notification) in pending.drain() {
                notification.task.abort();
            }
        }
    }
}

#[async_trait]
impl NotificationCenter for LocalNotificationCenter {
    async fn request_authorization(&self, options: AuthorizationOptions) -> anyhow::Result<bool> {
        log::info!("Requesting notification authorization {options:?}");

        let status = if self.grant_authorization {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
        *self.authorization.write().await = status;

        Ok(self.grant_authorization)
    }

    async fn authorization_status(&self) -> AuthorizationStatus {
        *self.authorization.read().await
    }

    async fn add(&self, request: NotificationRequest) -> anyhow::Result<()> {
        if request.trigger.repeats {
            anyhow::bail!("Repeating triggers are not supported");
        }

        let mut pending = self.pending.write().await;
        if let Some(previous) = pending.remove(&request.identifier) {
            log::info!("Replacing pending notification {}", request.identifier);
            previous.task.abort();
        }

        let task = self.spawn_delivery_task(request.clone())?;
        pending.insert(request.identifier.clone(), PendingNotification { request, task });

        Ok(())
    }

    async fn remove_all_pending(&self) {
        let mut pending = self.pending.write().await;
        let removed = pending.len();
        for (_, notification) in pending.drain() {
            notification.task.abort();
        }

        if removed > 0 {
            log::info!("Removed {removed} pending notification(s)");
        }
    }

    async fn pending_requests(&self) -> Vec<NotificationRequest> {
        self.pending
            .read()
            .await
            .values()
            .map(|notification| notification.request.clone())
            .collect()
    }
}

/// Next instant strictly after `now` whose local wall-clock time is `fire_at`.
/// Days on which `fire_at` does not exist locally (DST gaps) are skipped.
pub(crate) fn next_occurrence<Z: TimeZone>(fire_at: &NaiveTime, now: &DateTime<Z>) -> DateTime<Z> {
    let timezone = now.timezone();
    let mut date = now.date_naive();

    loop {
        if let Some(candidate) = timezone.from_local_datetime(&date.and_time(*fire_at)).earliest() {
            if candidate > *now {
                return candidate;
            }
        }

        date = date
            .checked_add_signed(TimeDelta::days(1))
            .expect("Not realistic to overflow");
    }
}

pub(crate) fn get_target_delay<Z: TimeZone>(fire_at: &NaiveTime, now: &DateTime<Z>) -> TimeDelta {
    next_occurrence(fire_at, now).signed_duration_since(now)
}
