//! mock-device: a deterministic, fully-typed surrogate for a hardware-control
//! device
//!
//! The device exposes the attribute catalog from `attr-catalog`, keeps
//! per-attribute values and qualities in an in-memory store, runs a 14-state
//! operational state machine, and answers three remote commands
//! (`ChangeState`, `ChangeShortScalarROQuality`, `Reset`). It owns no network
//! transport; a hosting runtime dispatches read/write/command calls onto a
//! [`MockDevice`] instance.

mod error;
pub use error::{DeviceError, Result};

mod state;
pub use state::DeviceState;

mod store;
pub use store::{AttrReading, AttributeStore};

mod config;
pub use config::{
    AttrConfig, AttributeConfigStore, ConfigError, InMemoryConfigStore, STATE_ATTR, STATUS_ATTR,
};

mod commands;
pub use commands::{
    Command, COMMAND_NAMES, CMD_CHANGE_SHORT_SCALAR_RO_QUALITY, CMD_CHANGE_STATE, CMD_RESET,
};

mod device;
pub use device::MockDevice;
