//! Mutable per-attribute state: last written value and cached quality.
//!
//! The store never invents state on read: an attribute with no stored value
//! reads as its synthesized catalog default, and that synthesized value is
//! not persisted. Only an explicit write or the reset protocol stores values.

use crate::error::{DeviceError, Result};
use attr_catalog::{AttrValue, AttributeCatalog, Quality, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// One attribute read: value, quality flag and the wall-clock time of the
/// read itself.
#[derive(Clone, Debug, PartialEq)]
pub struct AttrReading {
    pub value: AttrValue,
    pub quality: Quality,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, Default)]
struct AttrSlot {
    current: Option<AttrValue>,
    quality: Quality,
}

/// Per-attribute mutable records, keyed by catalog name. Callers serialise
/// access (the device wraps the store in a mutex); within one call every
/// value swap is whole, so no partial-shape write is ever observable.
#[derive(Debug)]
pub struct AttributeStore {
    catalog: Arc<AttributeCatalog>,
    slots: HashMap<&'static str, AttrSlot>,
}

impl AttributeStore {
    pub fn new(catalog: Arc<AttributeCatalog>) -> Self {
        let slots = catalog
            .names()
            .map(|name| (name, AttrSlot::default()))
            .collect();
        Self { catalog, slots }
    }

    pub fn catalog(&self) -> &AttributeCatalog {
        &self.catalog
    }

    /// Read one attribute. Falls back to the synthesized catalog default when
    /// nothing has been written; the fallback is computed, not stored.
    pub fn read(&self, name: &str) -> Result<AttrReading> {
        let kind = self
            .catalog
            .lookup(name)
            .ok_or_else(|| DeviceError::NotFound(name.to_string()))?;
        let slot = self.slots.get(kind.name()).cloned().unwrap_or_default();
        let value = match slot.current {
            Some(value) => value,
            None => kind.synthesized_default(),
        };
        debug!("read {} quality {}", kind.name(), slot.quality);
        Ok(AttrReading {
            value,
            quality: slot.quality,
            timestamp: Timestamp::now(),
        })
    }

    /// Replace one attribute's value. Rejects read-only attributes and values
    /// whose kind or shape disagrees with the catalog; the swap is all-or-
    /// nothing.
    pub fn write(&mut self, name: &str, value: AttrValue) -> Result<()> {
        let kind = self
            .catalog
            .lookup(name)
            .ok_or_else(|| DeviceError::NotFound(name.to_string()))?;
        if !kind.is_writable() {
            return Err(DeviceError::NotWritable(name.to_string()));
        }
        kind.check_value(&value)
            .map_err(|reason| DeviceError::TypeMismatch {
                name: name.to_string(),
                reason,
            })?;
        if let Some(slot) = self.slots.get_mut(kind.name()) {
            slot.current = Some(value);
        }
        debug!("wrote {}", kind.name());
        Ok(())
    }

    /// Overwrite one attribute's cached quality flag.
    pub fn set_quality(&mut self, name: &str, quality: Quality) -> Result<()> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| DeviceError::NotFound(name.to_string()))?;
        slot.quality = quality;
        Ok(())
    }

    /// The value phase of the reset protocol: every read-write attribute gets
    /// its synthesized default stored explicitly, and every cached quality
    /// returns to `Valid`. Read-only attributes keep computed values.
    pub fn reset_values(&mut self) {
        for kind in self.catalog.iter() {
            if let Some(slot) = self.slots.get_mut(kind.name()) {
                if kind.is_writable() {
                    slot.current = Some(kind.synthesized_default());
                }
                slot.quality = Quality::Valid;
            }
        }
    }
}
