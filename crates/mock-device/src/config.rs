//! The external attribute-config collaborator: per-attribute unit and
//! numeric thresholds, read and rewritten by the reset protocol.
//!
//! The trait is the consumed interface; [`InMemoryConfigStore`] is the
//! in-process implementation used by tests and the CLI so everything runs
//! without a remote configuration store.

use attr_catalog::{AttributeCatalog, NumericDefaults};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Device-level state attribute name, configured alongside the catalogued
/// attributes.
pub const STATE_ATTR: &str = "State";
/// Device-level status attribute name.
pub const STATUS_ATTR: &str = "Status";

/// Per-attribute configuration as held by the collaborator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrConfig {
    pub unit: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_alarm: Option<f64>,
    pub max_alarm: Option<f64>,
    pub min_warning: Option<f64>,
    pub max_warning: Option<f64>,
}

impl AttrConfig {
    pub fn with_unit(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            ..Self::default()
        }
    }

    /// Overwrite the three threshold pairs from a defaults-table row.
    pub fn apply_limits(&mut self, limits: &NumericDefaults) {
        self.min_value = Some(limits.range.0);
        self.max_value = Some(limits.range.1);
        self.min_alarm = Some(limits.alarm.0);
        self.max_alarm = Some(limits.alarm.1);
        self.min_warning = Some(limits.warning.0);
        self.max_warning = Some(limits.warning.1);
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config store unavailable: {0}")]
    Unavailable(String),
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
}

/// Minimal blocking interface to the configuration collaborator.
pub trait AttributeConfigStore: Send + Sync {
    /// Names of every attribute the store holds a config for.
    fn list_attributes(&self) -> Result<Vec<String>, ConfigError>;

    /// Fetch one attribute's config.
    fn get_config(&self, name: &str) -> Result<AttrConfig, ConfigError>;

    /// Replace one attribute's config.
    fn set_config(&self, name: &str, config: AttrConfig) -> Result<(), ConfigError>;
}

/// In-process config store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    entries: Mutex<HashMap<String, AttrConfig>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one entry per catalogued attribute (unit and limits as declared)
    /// plus the `State`/`Status` rows a hosting runtime would expose.
    pub fn seeded(catalog: &AttributeCatalog) -> Self {
        let mut entries = HashMap::new();
        for kind in catalog.iter() {
            let mut config = AttrConfig::with_unit(kind.unit());
            if let Some(limits) = kind.limits() {
                config.apply_limits(limits);
            }
            entries.insert(kind.name().to_string(), config);
        }
        entries.insert(STATE_ATTR.to_string(), AttrConfig::default());
        entries.insert(STATUS_ATTR.to_string(), AttrConfig::default());
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl AttributeConfigStore for InMemoryConfigStore {
    fn list_attributes(&self) -> Result<Vec<String>, ConfigError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn get_config(&self, name: &str) -> Result<AttrConfig, ConfigError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownAttribute(name.to_string()))
    }

    fn set_config(&self, name: &str, config: AttrConfig) -> Result<(), ConfigError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(name.to_string(), config);
        Ok(())
    }
}
