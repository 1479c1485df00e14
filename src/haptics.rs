use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticKind {
    /// Repeating alert pulse played while the alarm is firing.
    Notification,
    /// Alarm set, alarm dismissed.
    Success,
    /// Alarm cancelled.
    Click,
}

impl fmt::Display for HapticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HapticKind::Notification => "notification",
            HapticKind::Success => "success",
            HapticKind::Click => "click",
        };
        f.write_str(name)
    }
}

pub trait HapticDevice: Send + Sync + 'static {
    fn play(&self, kind: HapticKind);
}

/// Device without a vibration motor. Pulses end up in the log.
#[derive(Debug, Default)]
pub struct LogHapticDevice;

impl HapticDevice for LogHapticDevice {
    fn play(&self, kind: HapticKind) {
        log::info!("[HAPTIC] {kind}");
    }
}
