use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

use crate::{
    haptics::{HapticDevice, HapticKind},
    notification::{
        AuthorizationOptions, AuthorizationStatus, NotificationCenter, NotificationRequest,
    },
};

#[derive(Clone, Default)]
pub struct RecordingHaptics {
    pulses: Arc<Mutex<Vec<HapticKind>>>,
}

impl RecordingHaptics {
    pub fn pulses(&self) -> Vec<HapticKind> {
        self.pulses.lock().unwrap().clone()
    }

    pub fn count(&self, kind: HapticKind) -> usize {
        self.pulses
            .lock()
            .unwrap()
            .iter()
            .filter(|pulse| **pulse == kind)
            .count()
    }

    pub fn clear(&self) {
        self.pulses.lock().unwrap().clear();
    }
}

impl HapticDevice for RecordingHaptics {
    fn play(&self, kind: HapticKind) {
        self.pulses.lock().unwrap().push(kind);
    }
}

/// Platform store that never fires on its own. Tests deliver by hand.
pub struct FakeNotificationCenter {
    status: Mutex<AuthorizationStatus>,
    grants: bool,
    fail_next_add: AtomicBool,
    pending: Mutex<Vec<NotificationRequest>>,
    requested_options: Mutex<Vec<AuthorizationOptions>>,
}

impl Default for FakeNotificationCenter {
    fn default() -> Self {
        Self {
            status: Mutex::new(AuthorizationStatus::NotDetermined),
            grants: true,
            fail_next_add: AtomicBool::new(false),
            pending: Mutex::new(Vec::new()),
            requested_options: Mutex::new(Vec::new()),
        }
    }
}

impl FakeNotificationCenter {
    pub fn authorized() -> Self {
        let center = Self::default();
        *center.status.lock().unwrap() = AuthorizationStatus::Authorized;
        center
    }

    pub fn denying() -> Self {
        Self {
            grants: false,
            ..Self::default()
        }
    }

    /// Authorization withdrawn in the system settings.
    pub fn revoke(&self) {
        *self.status.lock().unwrap() = AuthorizationStatus::Denied;
    }

    pub fn fail_next_add(&self) {
        self.fail_next_add.store(true, Ordering::SeqCst);
    }

    pub fn pending(&self) -> Vec<NotificationRequest> {
        self.pending.lock().unwrap().clone()
    }

    pub fn requested_options(&self) -> Vec<AuthorizationOptions> {
        self.requested_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationCenter for FakeNotificationCenter {
    async fn request_authorization(&self, options: AuthorizationOptions) -> anyhow::Result<bool> {
        self.requested_options.lock().unwrap().push(options);
        *self.status.lock().unwrap() = if self.grants {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
        Ok(self.grants)
    }

    async fn authorization_status(&self) -> AuthorizationStatus {
        *self.status.lock().unwrap()
    }

    async fn add(&self, request: NotificationRequest) -> anyhow::Result<()> {
        if self.fail_next_add.swap(false, Ordering::SeqCst) {
            anyhow::bail!("Notification store unavailable");
        }

        let mut pending = self.pending.lock().unwrap();
        pending.retain(|existing| existing.identifier != request.identifier);
        pending.push(request);
        Ok(())
    }

    async fn remove_all_pending(&self) {
        self.pending.lock().unwrap().clear();
    }

    async fn pending_requests(&self) -> Vec<NotificationRequest> {
        self.pending()
    }
}
