//! The device facade: attribute reads/writes, command dispatch and the reset
//! protocol, wired over the catalog, the store and the config collaborator.

use crate::commands::Command;
use crate::config::{AttributeConfigStore, InMemoryConfigStore, STATE_ATTR, STATUS_ATTR};
use crate::error::Result;
use crate::state::DeviceState;
use crate::store::{AttrReading, AttributeStore};
use attr_catalog::{
    float_defaults, short_defaults, AttrValue, AttributeCatalog, Quality, DOUBLE_SCALAR,
    FLOAT_SCALAR, SHORT_SCALAR, SHORT_SCALAR_RO,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// One logical device instance. Handles are `Send + Sync`; a hosting runtime
/// may dispatch calls from any number of client connections onto it.
pub struct MockDevice {
    catalog: Arc<AttributeCatalog>,
    store: Mutex<AttributeStore>,
    state: Mutex<DeviceState>,
    config: Arc<dyn AttributeConfigStore>,
}

impl MockDevice {
    /// Build a device over the given config collaborator. Starts in ON with
    /// no stored attribute values.
    pub fn new(config: Arc<dyn AttributeConfigStore>) -> Self {
        let catalog = Arc::new(AttributeCatalog::standard());
        let store = AttributeStore::new(catalog.clone());
        info!(
            "mock device initialised with {} attributes, state {}",
            catalog.len(),
            DeviceState::default()
        );
        Self {
            catalog,
            store: Mutex::new(store),
            state: Mutex::new(DeviceState::default()),
            config,
        }
    }

    /// Device plus a seeded in-process config store, for tests and demos.
    pub fn with_in_memory_config() -> (Self, Arc<InMemoryConfigStore>) {
        let config = Arc::new(InMemoryConfigStore::seeded(&AttributeCatalog::standard()));
        (Self::new(config.clone()), config)
    }

    pub fn catalog(&self) -> &AttributeCatalog {
        &self.catalog
    }

    pub fn state(&self) -> DeviceState {
        *self.state_guard()
    }

    pub fn status(&self) -> String {
        self.state().status_text()
    }

    /// Read one attribute: stored value or synthesized default, with quality
    /// and the timestamp of this read.
    pub fn read(&self, name: &str) -> Result<AttrReading> {
        self.store_guard().read(name)
    }

    /// Write one attribute; last write wins.
    pub fn write(&self, name: &str, value: AttrValue) -> Result<()> {
        self.store_guard().write(name, value)
    }

    /// Resolve and run an inbound command call. Only an unknown command name
    /// fails; the commands themselves never do.
    pub fn invoke(&self, name: &str, arg: Option<&str>) -> Result<()> {
        let command = Command::parse(name, arg)?;
        self.execute(command);
        Ok(())
    }

    pub fn execute(&self, command: Command) {
        match command {
            Command::ChangeState(name) => self.change_state(&name),
            Command::ChangeShortScalarROQuality(name) => self.change_ro_quality(&name),
            Command::Reset => self.reset(),
        }
    }

    fn change_state(&self, name: &str) {
        let next = DeviceState::parse_lenient(name);
        let mut state = self.state_guard();
        let previous = *state;
        *state = next;
        info!("state change {previous} -> {next} (requested {name:?})");
    }

    fn change_ro_quality(&self, name: &str) {
        let quality = Quality::parse_lenient(name);
        match self.store_guard().set_quality(SHORT_SCALAR_RO, quality) {
            Ok(()) => debug!("{SHORT_SCALAR_RO} quality set to {quality}"),
            Err(err) => warn!("could not set {SHORT_SCALAR_RO} quality: {err}"),
        }
    }

    /// The reset protocol: rewrite every attribute's config through the
    /// collaborator (per-attribute failures are logged and skipped), then
    /// restore every read-write value and every quality to catalog defaults
    /// under the exclusive store lock. Never fails.
    pub fn reset(&self) {
        self.reset_configs();
        self.store_guard().reset_values();
        info!("reset complete; attribute values restored to catalog defaults");
    }

    fn reset_configs(&self) {
        let names = match self.config.list_attributes() {
            Ok(names) => names,
            Err(err) => {
                warn!("config store listing failed ({err}); falling back to catalog names");
                let mut names: Vec<String> = self.catalog.names().map(str::to_string).collect();
                names.push(STATE_ATTR.to_string());
                names.push(STATUS_ATTR.to_string());
                names
            }
        };
        for name in names {
            let mut config = match self.config.get_config(&name) {
                Ok(config) => config,
                Err(err) => {
                    warn!("config reset skipped for {name}: {err}");
                    continue;
                }
            };
            config.unit = reset_unit(&name).to_string();
            match name.as_str() {
                SHORT_SCALAR => config.apply_limits(&short_defaults()),
                FLOAT_SCALAR | DOUBLE_SCALAR => config.apply_limits(&float_defaults()),
                _ => {}
            }
            if let Err(err) = self.config.set_config(&name, config) {
                warn!("config reset skipped for {name}: {err}");
            }
        }
    }

    fn store_guard(&self) -> MutexGuard<'_, AttributeStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_guard(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Unit assigned by the reset protocol: dimensionless for boolean and string
/// attributes, the two system attributes and the `_nu` family; "mm" for the
/// rest.
fn reset_unit(name: &str) -> &'static str {
    if name.starts_with("string")
        || name.starts_with("boolean")
        || name == STATE_ATTR
        || name == STATUS_ATTR
        || name.ends_with("_nu")
    {
        ""
    } else {
        "mm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CMD_CHANGE_SHORT_SCALAR_RO_QUALITY, CMD_CHANGE_STATE, CMD_RESET};
    use crate::config::{AttrConfig, ConfigError};
    use crate::error::DeviceError;
    use attr_catalog::ScalarValue;

    fn device() -> (MockDevice, Arc<InMemoryConfigStore>) {
        MockDevice::with_in_memory_config()
    }

    #[test]
    fn change_state_is_case_insensitive_and_never_fails() {
        let (device, _) = device();
        for spelling in ["alarm", "ALARM", "Alarm"] {
            device.invoke(CMD_CHANGE_STATE, Some("off")).unwrap();
            device.invoke(CMD_CHANGE_STATE, Some(spelling)).unwrap();
            assert_eq!(device.state(), DeviceState::Alarm);
        }

        device.invoke(CMD_CHANGE_STATE, Some("bogus")).unwrap();
        assert_eq!(device.state(), DeviceState::Unknown);
        assert_eq!(device.status(), "The device is in UNKNOWN state.");
    }

    #[test]
    fn unknown_command_names_are_not_found() {
        let (device, _) = device();
        assert!(matches!(
            device.invoke("SelfDestruct", None),
            Err(DeviceError::NotFound(_))
        ));
        // The state machine did not move.
        assert_eq!(device.state(), DeviceState::On);
    }

    #[test]
    fn ro_quality_follows_the_command() {
        let (device, _) = device();
        device
            .invoke(CMD_CHANGE_SHORT_SCALAR_RO_QUALITY, Some("warning"))
            .unwrap();
        assert_eq!(
            device.read(SHORT_SCALAR_RO).unwrap().quality,
            Quality::Warning
        );

        device
            .invoke(CMD_CHANGE_SHORT_SCALAR_RO_QUALITY, Some("bogus"))
            .unwrap();
        assert_eq!(device.read(SHORT_SCALAR_RO).unwrap().quality, Quality::Valid);

        // Other attributes never see the flag.
        assert_eq!(device.read(SHORT_SCALAR).unwrap().quality, Quality::Valid);
    }

    #[test]
    fn reset_restores_values_and_configs() {
        let (device, config) = device();

        device.write(SHORT_SCALAR, AttrValue::scalar(999i16)).unwrap();
        // Scramble a few configs so the rewrite is observable.
        config
            .set_config(SHORT_SCALAR, AttrConfig::with_unit("furlong"))
            .unwrap();
        config
            .set_config("string_scalar", AttrConfig::with_unit("mm"))
            .unwrap();

        device.invoke(CMD_RESET, None).unwrap();

        assert_eq!(
            device.read(SHORT_SCALAR).unwrap().value,
            AttrValue::scalar(123i16)
        );

        let cfg = config.get_config(SHORT_SCALAR).unwrap();
        assert_eq!(cfg.unit, "mm");
        assert_eq!(cfg.min_value, Some(-1230.0));
        assert_eq!(cfg.max_value, Some(1230.0));
        assert_eq!(cfg.min_alarm, Some(-615.0));
        assert_eq!(cfg.max_warning, Some(369.0));

        let float_row = float_defaults();
        for name in [FLOAT_SCALAR, DOUBLE_SCALAR] {
            let cfg = config.get_config(name).unwrap();
            assert_eq!(cfg.unit, "mm");
            assert_eq!(cfg.min_value, Some(float_row.range.0));
            assert_eq!(cfg.max_value, Some(float_row.range.1));
        }

        // Unit rules across the families.
        for name in [
            "string_scalar",
            "string_spectrum",
            "boolean_image",
            "short_scalar_nu",
            STATE_ATTR,
            STATUS_ATTR,
        ] {
            assert_eq!(config.get_config(name).unwrap().unit, "", "{name}");
        }
        for name in ["uchar_scalar", "short_image", SHORT_SCALAR_RO] {
            assert_eq!(config.get_config(name).unwrap().unit, "mm", "{name}");
        }
    }

    #[test]
    fn reset_is_idempotent() {
        let (device, config) = device();
        device.write(SHORT_SCALAR, AttrValue::scalar(-42i16)).unwrap();
        device
            .write("string_spectrum", AttrValue::spectrum(["a", "b"]))
            .unwrap();
        device
            .invoke(CMD_CHANGE_SHORT_SCALAR_RO_QUALITY, Some("alarm"))
            .unwrap();

        device.reset();
        let snapshot: Vec<_> = device
            .catalog()
            .iter()
            .map(|kind| {
                let reading = device.read(kind.name()).unwrap();
                (kind.name(), reading.value, reading.quality)
            })
            .collect();
        let configs: Vec<_> = config
            .list_attributes()
            .unwrap()
            .into_iter()
            .map(|name| (config.get_config(&name).unwrap(), name))
            .collect();

        device.reset();
        for (name, value, quality) in snapshot {
            let reading = device.read(name).unwrap();
            assert_eq!(reading.value, value, "{name}");
            assert_eq!(reading.quality, quality, "{name}");
        }
        for (cfg, name) in configs {
            assert_eq!(config.get_config(&name).unwrap(), cfg, "{name}");
        }
    }

    // Config store that refuses to serve one attribute.
    struct FlakyConfigStore {
        inner: InMemoryConfigStore,
        broken: &'static str,
    }

    impl AttributeConfigStore for FlakyConfigStore {
        fn list_attributes(&self) -> Result<Vec<String>, ConfigError> {
            self.inner.list_attributes()
        }

        fn get_config(&self, name: &str) -> Result<AttrConfig, ConfigError> {
            if name == self.broken {
                return Err(ConfigError::Unavailable("simulated outage".to_string()));
            }
            self.inner.get_config(name)
        }

        fn set_config(&self, name: &str, config: AttrConfig) -> Result<(), ConfigError> {
            self.inner.set_config(name, config)
        }
    }

    #[test]
    fn reset_tolerates_per_attribute_config_failures() {
        let catalog = AttributeCatalog::standard();
        let config = Arc::new(FlakyConfigStore {
            inner: InMemoryConfigStore::seeded(&catalog),
            broken: SHORT_SCALAR,
        });
        let device = MockDevice::new(config.clone());

        config
            .inner
            .set_config("uchar_scalar", AttrConfig::with_unit("deg"))
            .unwrap();
        device.write(SHORT_SCALAR, AttrValue::scalar(999i16)).unwrap();

        device.reset();

        // The broken attribute kept its old config, everything else moved on
        // and the value reset still ran.
        assert_eq!(config.inner.get_config("uchar_scalar").unwrap().unit, "mm");
        assert_eq!(
            device.read(SHORT_SCALAR).unwrap().value,
            AttrValue::scalar(123i16)
        );
    }

    // Config store whose listing is down entirely.
    struct ListlessConfigStore {
        inner: InMemoryConfigStore,
    }

    impl AttributeConfigStore for ListlessConfigStore {
        fn list_attributes(&self) -> Result<Vec<String>, ConfigError> {
            Err(ConfigError::Unavailable("listing down".to_string()))
        }

        fn get_config(&self, name: &str) -> Result<AttrConfig, ConfigError> {
            self.inner.get_config(name)
        }

        fn set_config(&self, name: &str, config: AttrConfig) -> Result<(), ConfigError> {
            self.inner.set_config(name, config)
        }
    }

    #[test]
    fn reset_falls_back_to_catalog_names_when_listing_fails() {
        let catalog = AttributeCatalog::standard();
        let config = Arc::new(ListlessConfigStore {
            inner: InMemoryConfigStore::seeded(&catalog),
        });
        let device = MockDevice::new(config.clone());

        config
            .inner
            .set_config(SHORT_SCALAR, AttrConfig::with_unit("deg"))
            .unwrap();

        device.reset();

        let cfg = config.inner.get_config(SHORT_SCALAR).unwrap();
        assert_eq!(cfg.unit, "mm");
        assert_eq!(cfg.max_value, Some(1230.0));
        assert_eq!(config.inner.get_config(STATE_ATTR).unwrap().unit, "");
    }

    #[test]
    fn concurrent_writers_leave_one_whole_value() {
        let (device, _) = device();
        let device = Arc::new(device);

        let mut handles = Vec::new();
        for worker in 0i16..8 {
            let device = device.clone();
            handles.push(std::thread::spawn(move || {
                for step in 0i16..50 {
                    let value = AttrValue::spectrum([worker, step, worker + step]);
                    device.write("short_spectrum", value).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Whichever write landed last, the value is whole: three shorts with
        // the third equal to the sum of the first two.
        match device.read("short_spectrum").unwrap().value {
            AttrValue::Spectrum(elements) => {
                assert_eq!(elements.len(), 3);
                match (&elements[0], &elements[1], &elements[2]) {
                    (
                        ScalarValue::Short(a),
                        ScalarValue::Short(b),
                        ScalarValue::Short(c),
                    ) => assert_eq!(a + b, *c),
                    other => panic!("unexpected element types: {other:?}"),
                }
            }
            other => panic!("expected a spectrum, got {other:?}"),
        }
    }

    #[test]
    fn reset_unit_rule_families() {
        assert_eq!(reset_unit("string_image"), "");
        assert_eq!(reset_unit("boolean_scalar"), "");
        assert_eq!(reset_unit("short_scalar_nu"), "");
        assert_eq!(reset_unit(STATE_ATTR), "");
        assert_eq!(reset_unit(STATUS_ATTR), "");
        assert_eq!(reset_unit("short_scalar"), "mm");
        assert_eq!(reset_unit("double_image"), "mm");
        assert_eq!(reset_unit("MIXEDcase"), "mm");
    }
}
