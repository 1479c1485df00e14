use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("Notification authorization was not granted")]
    PermissionDenied,

    #[error("Scheduling the alarm notification failed: {0:#}")]
    SchedulingFailed(anyhow::Error),

    #[error("Alarm controller is no longer running")]
    Disconnected,
}
