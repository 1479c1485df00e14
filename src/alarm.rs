use std::{fmt, str::FromStr};

use chrono::{NaiveTime, Timelike};

/// The only notification identifier this app ever registers.
pub const ALARM_IDENTIFIER: &str = "getupplease-alarm";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn alarm() -> Self {
        Self::new(ALARM_IDENTIFIER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_alarm(&self) -> bool {
        self.0 == ALARM_IDENTIFIER
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wall-clock time of day an alarm fires at. Only hour and minute are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlarmTime(NaiveTime);

impl AlarmTime {
    pub fn new(inner: NaiveTime) -> Self {
        let normalized_time = inner
            .with_second(0)
            .and_then(|time| time.with_nanosecond(0))
            .expect("Zero seconds and nanoseconds are always valid.");
        Self(normalized_time)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn time(&self) -> &NaiveTime {
        &self.0
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for AlarmTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M").map(Self::new)
    }
}

/// The single pending alarm, as handed to the notification bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRequest {
    pub fire_time: AlarmTime,
    pub identifier: RequestId,
}

impl AlarmRequest {
    pub fn new(fire_time: AlarmTime) -> Self {
        Self {
            fire_time,
            identifier: RequestId::alarm(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmState {
    #[default]
    Idle,
    Armed(AlarmTime),
    Firing,
}
