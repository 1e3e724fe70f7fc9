//! The device's remote command surface: three named operations taking at
//! most one string argument.

use crate::error::{DeviceError, Result};

pub const CMD_CHANGE_STATE: &str = "ChangeState";
pub const CMD_CHANGE_SHORT_SCALAR_RO_QUALITY: &str = "ChangeShortScalarROQuality";
pub const CMD_RESET: &str = "Reset";

/// Every command the device answers. Command names are a versioned contract
/// and match exactly; only their arguments get lenient parsing.
pub const COMMAND_NAMES: [&str; 3] = [
    CMD_CHANGE_STATE,
    CMD_CHANGE_SHORT_SCALAR_RO_QUALITY,
    CMD_RESET,
];

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Drive the device state machine; unrecognised names land in UNKNOWN.
    ChangeState(String),
    /// Set the quality reported by `short_scalar_ro` reads; unrecognised
    /// names reset it to VALID.
    ChangeShortScalarROQuality(String),
    /// Restore attribute configs and values to catalog defaults.
    Reset,
}

impl Command {
    /// Resolve an inbound (name, argument) pair. A missing argument is the
    /// empty string, which both argument commands map to their safe default.
    pub fn parse(name: &str, arg: Option<&str>) -> Result<Self> {
        let arg = arg.unwrap_or("");
        match name {
            CMD_CHANGE_STATE => Ok(Self::ChangeState(arg.to_string())),
            CMD_CHANGE_SHORT_SCALAR_RO_QUALITY => {
                Ok(Self::ChangeShortScalarROQuality(arg.to_string()))
            }
            CMD_RESET => Ok(Self::Reset),
            other => Err(DeviceError::NotFound(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ChangeState(_) => CMD_CHANGE_STATE,
            Self::ChangeShortScalarROQuality(_) => CMD_CHANGE_SHORT_SCALAR_RO_QUALITY,
            Self::Reset => CMD_RESET,
        }
    }
}
