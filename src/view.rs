use chrono::{DateTime, TimeZone};

use crate::alarm::AlarmState;

/// Frame of the pulsing animation shown while the presenter is firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    Still,
    Bright,
    Dim,
}

impl Pulse {
    pub fn frame(firing: bool, tick: u64) -> Self {
        match (firing, tick % 2) {
            (false, _) => Pulse::Still,
            (true, 0) => Pulse::Bright,
            (true, _) => Pulse::Dim,
        }
    }
}

/// Text rendition of the watch face for the given state.
pub fn render<Tz: TimeZone>(state: &AlarmState, pulse: Pulse, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match state {
        AlarmState::Idle => "No Alarm Set".to_owned(),
        AlarmState::Armed(fire_time) => format!("Alarm Set {fire_time}"),
        AlarmState::Firing => {
            let time = now.format("%H:%M");
            match pulse {
                Pulse::Still => format!("WAKE UP! {time}  [dismiss]"),
                Pulse::Bright => format!("(( WAKE UP! {time} ))  [dismiss]"),
                Pulse::Dim => format!(" ( WAKE UP! {time} )   [dismiss]"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::alarm::AlarmTime;

    use super::*;

    #[test]
    fn renders_each_state() {
        let now = Utc.with_ymd_and_hms(2025, 8, 6, 7, 59, 30).unwrap();

        assert_eq!(render(&AlarmState::Idle, Pulse::Still, &now), "No Alarm Set");
        assert_eq!(
            render(
                &AlarmState::Armed(AlarmTime::from_hm(8, 0).unwrap()),
                Pulse::Still,
                &now
            ),
            "Alarm Set 08:00"
        );
        assert_eq!(
            render(&AlarmState::Firing, Pulse::Still, &now),
            "WAKE UP! 07:59  [dismiss]"
        );
    }

    #[test]
    fn firing_face_alternates_while_pulsing() {
        let now = Utc.with_ymd_and_hms(2025, 8, 6, 8, 0, 0).unwrap();
        let frames: Vec<_> = (0..3)
            .map(|tick| render(&AlarmState::Firing, Pulse::frame(true, tick), &now))
            .collect();

        assert_eq!(frames[0], "(( WAKE UP! 08:00 ))  [dismiss]");
        assert_eq!(frames[1], " ( WAKE UP! 08:00 )   [dismiss]");
        assert_eq!(frames[2], frames[0]);
    }

    #[test]
    fn stopped_presenter_does_not_animate() {
        assert_eq!(Pulse::frame(false, 0), Pulse::Still);
        assert_eq!(Pulse::frame(false, 1), Pulse::Still);
    }
}
