pub mod alarm;
pub mod appsettings;
pub mod controller;
pub mod error;
pub mod haptics;
pub mod notification;
pub mod presenter;
pub mod state_machine;
pub mod view;

#[cfg(test)]
mod test_utils;

pub use alarm::{ALARM_IDENTIFIER, AlarmRequest, AlarmState, AlarmTime, RequestId};
pub use controller::AlarmController;
pub use error::AlarmError;
pub use presenter::AlarmPresenter;
pub use state_machine::AlarmStateMachine;
