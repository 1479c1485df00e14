//! The UI-owned execution context.
//!
//! [`AlarmController`] moves the state machine onto a single task. User
//! commands and platform deliveries both arrive as messages on that task, so a
//! delivery can never interleave with a dismiss that is half done.

use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time,
};

use crate::{
    alarm::{AlarmState, AlarmTime},
    error::AlarmError,
    notification::DeliveryReceiver,
    state_machine::AlarmStateMachine,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum AlarmCommand {
    Arm {
        fire_time: AlarmTime,
        reply: oneshot::Sender<Result<AlarmState, AlarmError>>,
    },
    Cancel {
        reply: oneshot::Sender<AlarmState>,
    },
    Dismiss {
        reply: oneshot::Sender<AlarmState>,
    },
}

pub struct AlarmController {
    sender: mpsc::Sender<AlarmCommand>,
    state: watch::Receiver<AlarmState>,
    firing: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl AlarmController {
    pub fn create(machine: AlarmStateMachine, deliveries: DeliveryReceiver) -> Self {
        let (sender, receiver) = mpsc::channel(16);
        let state = machine.subscribe();
        let firing = machine.presenter().subscribe_firing();
        let task = tokio::spawn(async move {
            Self::handle_messages(machine, receiver, deliveries).await;
        });

        Self {
            sender,
            state,
            firing,
            task,
        }
    }

    pub async fn arm(&self, fire_time: AlarmTime) -> Result<AlarmState, AlarmError> {
        let (reply, response) = oneshot::channel();
        self.send(AlarmCommand::Arm { fire_time, reply }).await?;
        response.await.map_err(|_| AlarmError::Disconnected)?
    }

    pub async fn cancel(&self) -> Result<AlarmState, AlarmError> {
        let (reply, response) = oneshot::channel();
        self.send(AlarmCommand::Cancel { reply }).await?;
        response.await.map_err(|_| AlarmError::Disconnected)
    }

    pub async fn dismiss(&self) -> Result<AlarmState, AlarmError> {
        let (reply, response) = oneshot::channel();
        self.send(AlarmCommand::Dismiss { reply }).await?;
        response.await.map_err(|_| AlarmError::Disconnected)
    }

    pub fn state(&self) -> AlarmState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AlarmState> {
        self.state.clone()
    }

    /// The presenter's firing flag, for animating the watch face.
    pub fn subscribe_firing(&self) -> watch::Receiver<bool> {
        self.firing.clone()
    }

    /// Closes the command channel and waits for the loop to tear down the
    /// vibration session.
    pub async fn shutdown(self) {
        let Self { sender, task, .. } = self;
        drop(sender);

        if time::timeout(SHUTDOWN_TIMEOUT, task).await.is_err() {
            log::warn!("Alarm controller did not stop within {SHUTDOWN_TIMEOUT:?}");
        }
    }

    async fn send(&self, command: AlarmCommand) -> Result<(), AlarmError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| AlarmError::Disconnected)
    }

    async fn handle_messages(
        mut machine: AlarmStateMachine,
        mut receiver: mpsc::Receiver<AlarmCommand>,
        mut deliveries: DeliveryReceiver,
    ) {
        loop {
            tokio::select! {
                command = receiver.recv() => match command {
                    Some(command) => Self::handle_command(&mut machine, command).await,
                    None => break,
                },
                Some(delivery) = deliveries.recv() => {
                    machine.handle_delivery(delivery);
                }
            }
        }

        log::info!("Alarm controller shutting down");
        machine.shutdown();
    }

    async fn handle_command(machine: &mut AlarmStateMachine, command: AlarmCommand) {
        // A dropped reply receiver means the caller stopped waiting. The
        // transition itself has already happened.
        match command {
            AlarmCommand::Arm { fire_time, reply } => {
                let _ = reply.send(machine.arm(fire_time).await);
            }
            AlarmCommand::Cancel { reply } => {
                let _ = reply.send(machine.cancel().await);
            }
            AlarmCommand::Dismiss { reply } => {
                let _ = reply.send(machine.dismiss());
            }
        }
    }
}

#[cfg(test)]
mod tests;
