use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::{self, JoinHandle},
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::haptics::{HapticDevice, HapticKind};

pub const DEFAULT_PULSE_INTERVAL: Duration = Duration::from_secs(2);

struct VibrationSession {
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl VibrationSession {
    fn invalidate(self) {
        self.cancellation_token.cancel();
        self.task.abort();
    }
}

/// Drives the full-screen alarm: a repeating alert pulse while firing and the
/// haptic feedback for the other user actions.
pub struct AlarmPresenter {
    haptics: Arc<dyn HapticDevice>,
    pulse_interval: Duration,
    session: Option<VibrationSession>,
    firing: watch::Sender<bool>,
}

impl AlarmPresenter {
    pub fn new(haptics: Arc<dyn HapticDevice>) -> Self {
        Self::with_pulse_interval(haptics, DEFAULT_PULSE_INTERVAL)
    }

    /// A zero interval falls back to [`DEFAULT_PULSE_INTERVAL`].
    pub fn with_pulse_interval(haptics: Arc<dyn HapticDevice>, pulse_interval: Duration) -> Self {
        let pulse_interval = if pulse_interval.is_zero() {
            log::warn!("Pulse interval must be non-zero, using {DEFAULT_PULSE_INTERVAL:?}");
            DEFAULT_PULSE_INTERVAL
        } else {
            pulse_interval
        };
        let (firing, _) = watch::channel(false);

        Self {
            haptics,
            pulse_interval,
            session: None,
            firing,
        }
    }

    /// Starts the vibration session. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.session.is_some() {
            log::warn!("Vibration session already running, not starting another one");
            return;
        }

        self.firing.send_replace(true);
        self.haptics.play(HapticKind::Notification);

        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();
        let haptics = Arc::clone(&self.haptics);
        let period = self.pulse_interval;

        log::info!("[VIBRATE] Pulsing every {:?}", period);

        let task = task::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = task_cancellation_token.cancelled() => break,
                    _ = interval.tick() => haptics.play(HapticKind::Notification),
                }
            }
        });

        self.session = Some(VibrationSession {
            task,
            cancellation_token,
        });
    }

    /// Tears down the vibration session. Safe to call at any time.
    pub fn stop(&mut self) {
        self.firing.send_replace(false);
        if let Some(session) = self.session.take() {
            session.invalidate();
            log::info!("[VIBRATE] Stopped");
        }
    }

    pub fn dismiss(&mut self) {
        self.stop();
        self.haptics.play(HapticKind::Success);
    }

    pub fn play_feedback(&self, kind: HapticKind) {
        self.haptics.play(kind);
    }

    pub fn is_firing(&self) -> bool {
        *self.firing.borrow()
    }

    /// The flag the watch face animates on. True between `start` and `stop`.
    pub fn subscribe_firing(&self) -> watch::Receiver<bool> {
        self.firing.subscribe()
    }

    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn pulse_interval(&self) -> Duration {
        self.pulse_interval
    }
}

impl Drop for AlarmPresenter {
    fn drop(&mut self) {
        self.stop();
    }
}
