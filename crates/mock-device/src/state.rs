//! Device-level operational state.

use core::fmt;
use serde::{Deserialize, Serialize};

/// The closed set of operational states a control-system device can report.
/// The device starts in `On`; only the `ChangeState` command moves it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceState {
    On,
    Off,
    Alarm,
    Fault,
    Standby,
    Close,
    Init,
    Unknown,
    Disable,
    Insert,
    Open,
    Extract,
    Moving,
    Running,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::On
    }
}

impl DeviceState {
    /// Case-insensitive name lookup. Unrecognised names map to `Unknown`
    /// rather than failing: a state command is never rejected.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "on" => Self::On,
            "off" => Self::Off,
            "alarm" => Self::Alarm,
            "fault" => Self::Fault,
            "standby" => Self::Standby,
            "close" => Self::Close,
            "init" => Self::Init,
            "unknown" => Self::Unknown,
            "disable" => Self::Disable,
            "insert" => Self::Insert,
            "open" => Self::Open,
            "extract" => Self::Extract,
            "moving" => Self::Moving,
            "running" => Self::Running,
            _ => Self::Unknown,
        }
    }

    /// Conventional status text paired with the state attribute.
    pub fn status_text(&self) -> String {
        format!("The device is in {self} state.")
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Alarm => "ALARM",
            Self::Fault => "FAULT",
            Self::Standby => "STANDBY",
            Self::Close => "CLOSE",
            Self::Init => "INIT",
            Self::Unknown => "UNKNOWN",
            Self::Disable => "DISABLE",
            Self::Insert => "INSERT",
            Self::Open => "OPEN",
            Self::Extract => "EXTRACT",
            Self::Moving => "MOVING",
            Self::Running => "RUNNING",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_on() {
        assert_eq!(DeviceState::default(), DeviceState::On);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(DeviceState::parse_lenient("alarm"), DeviceState::Alarm);
        assert_eq!(DeviceState::parse_lenient("ALARM"), DeviceState::Alarm);
        assert_eq!(DeviceState::parse_lenient("Alarm"), DeviceState::Alarm);
        assert_eq!(DeviceState::parse_lenient(" running "), DeviceState::Running);
    }

    #[test]
    fn unrecognised_names_map_to_unknown() {
        assert_eq!(DeviceState::parse_lenient("bogus"), DeviceState::Unknown);
        assert_eq!(DeviceState::parse_lenient(""), DeviceState::Unknown);
    }

    #[test]
    fn every_display_name_round_trips() {
        let all = [
            DeviceState::On,
            DeviceState::Off,
            DeviceState::Alarm,
            DeviceState::Fault,
            DeviceState::Standby,
            DeviceState::Close,
            DeviceState::Init,
            DeviceState::Unknown,
            DeviceState::Disable,
            DeviceState::Insert,
            DeviceState::Open,
            DeviceState::Extract,
            DeviceState::Moving,
            DeviceState::Running,
        ];
        assert_eq!(all.len(), 14);
        for state in all {
            assert_eq!(DeviceState::parse_lenient(&state.to_string()), state);
        }
    }

    #[test]
    fn status_text_names_the_state() {
        assert_eq!(
            DeviceState::Moving.status_text(),
            "The device is in MOVING state."
        );
    }
}
