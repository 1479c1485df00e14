//! Single source of truth for the alarm.
//!
//! ```text
//!        arm(t)              delivery              dismiss()
//!  Idle ───────► Armed(t) ───────────► Firing ───────────► Idle
//!   ▲            │    ▲ arm(t')
//!   └─cancel()───┘    └─────┘
//! ```
//!
//! Every other combination is logged and ignored.

use tokio::sync::watch;

use crate::{
    alarm::{AlarmState, AlarmTime},
    error::AlarmError,
    haptics::HapticKind,
    notification::{Delivery, NotificationBridge},
    presenter::AlarmPresenter,
};

pub struct AlarmStateMachine {
    bridge: NotificationBridge,
    presenter: AlarmPresenter,
    state: watch::Sender<AlarmState>,
}

impl AlarmStateMachine {
    pub fn new(bridge: NotificationBridge, presenter: AlarmPresenter) -> Self {
        let (state, _) = watch::channel(AlarmState::Idle);

        Self {
            bridge,
            presenter,
            state,
        }
    }

    pub fn state(&self) -> AlarmState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AlarmState> {
        self.state.subscribe()
    }

    pub fn bridge(&self) -> &NotificationBridge {
        &self.bridge
    }

    pub fn presenter(&self) -> &AlarmPresenter {
        &self.presenter
    }

    pub async fn arm(&mut self, fire_time: AlarmTime) -> Result<AlarmState, AlarmError> {
        match self.state() {
            AlarmState::Idle | AlarmState::Armed(_) => {}
            AlarmState::Firing => {
                log::warn!("[ARM] Ignoring arm({fire_time}) while the alarm is firing");
                return Ok(AlarmState::Firing);
            }
        }

        match self.bridge.schedule(fire_time).await {
            Ok(request_id) => {
                log::info!("[ARM] Alarm armed for {fire_time}. Request {request_id}");
                self.presenter.play_feedback(HapticKind::Success);
                Ok(self.transition(AlarmState::Armed(fire_time)))
            }
            Err(AlarmError::SchedulingFailed(error)) => {
                log::error!("[ARM] Could not schedule alarm for {fire_time}: {error:#}");
                // Idle means nothing pending, whatever the center kept.
                self.bridge.cancel_all().await;
                self.transition(AlarmState::Idle);
                Err(AlarmError::SchedulingFailed(error))
            }
            Err(error) => {
                log::warn!("[ARM] Alarm for {fire_time} not armed: {error}");
                Err(error)
            }
        }
    }

    pub async fn cancel(&mut self) -> AlarmState {
        match self.state() {
            AlarmState::Armed(fire_time) => {
                self.bridge.cancel_all().await;
                self.presenter.play_feedback(HapticKind::Click);
                log::info!("[CANCEL] Alarm for {fire_time} cancelled");
                self.transition(AlarmState::Idle)
            }
            state => {
                log::warn!("[CANCEL] Ignoring cancel in state {state:?}");
                state
            }
        }
    }

    pub fn handle_delivery(&mut self, delivery: Delivery) -> AlarmState {
        match self.state() {
            AlarmState::Armed(fire_time) => {
                log::info!(
                    "[FIRE] Alarm for {fire_time} delivered. [origin = {:?}, request = {}]",
                    delivery.origin,
                    delivery.request_id
                );
                self.presenter.start();
                self.transition(AlarmState::Firing)
            }
            state => {
                log::warn!(
                    "[FIRE] Ignoring delivery in state {state:?}. [origin = {:?}, request = {}]",
                    delivery.origin,
                    delivery.request_id
                );
                state
            }
        }
    }

    pub fn dismiss(&mut self) -> AlarmState {
        match self.state() {
            AlarmState::Firing => {
                self.presenter.dismiss();
                log::info!("[DISMISS] Alarm dismissed");
                self.transition(AlarmState::Idle)
            }
            state => {
                log::warn!("[DISMISS] Ignoring dismiss in state {state:?}");
                state
            }
        }
    }

    /// Stops any running vibration. Called when the owning context goes away.
    pub fn shutdown(&mut self) {
        self.presenter.stop();
    }

    fn transition(&mut self, new_state: AlarmState) -> AlarmState {
        self.state.send_replace(new_state);
        new_state
    }
}
