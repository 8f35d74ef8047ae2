// ── Drivers and capability projection ──
//
// A driver is a named bundle of behaviour factories plus the device
// identification (manufacturer / hardware / software) it applies to.
// Entities bind a driver lazily and project themselves onto capabilities
// through it.

mod capability;
mod catalog;
mod registry;
mod service;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub use capability::{
    BehaviourContext, BehaviourFactory, Capability, CapabilityFamily, DriverData, ErasedFactory,
    HandlerContext,
};
pub use catalog::BehaviourCatalog;
pub use registry::{DriverDefinition, DriverRegistry, DriverResolver};
pub use service::DriverService;

/// Named set of behaviours for a family of devices.
pub struct Driver {
    name: String,
    manufacturer: String,
    hw_version: String,
    sw_version: String,
    properties: BTreeMap<String, String>,
    behaviours: HashMap<String, ErasedFactory>,
}

impl Driver {
    pub fn builder(name: impl Into<String>) -> DriverBuilder {
        DriverBuilder {
            driver: Self {
                name: name.into(),
                manufacturer: String::new(),
                hw_version: String::new(),
                sw_version: String::new(),
                properties: BTreeMap::new(),
                behaviours: HashMap::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn hw_version(&self) -> &str {
        &self.hw_version
    }

    pub fn sw_version(&self) -> &str {
        &self.sw_version
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Names of every capability this driver can produce, sorted.
    pub fn capabilities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.behaviours.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.behaviours.contains_key(name)
    }

    /// True if this driver has a factory for `C` of the right type.
    pub fn supports<C: Capability>(&self) -> bool {
        self.behaviours
            .get(C::NAME)
            .is_some_and(ErasedFactory::is::<C>)
    }

    /// Build the behaviour for `C`, if this driver supports it.
    pub fn create<C: Capability>(&self, context: &BehaviourContext) -> Option<Box<C::Behaviour>> {
        self.behaviours.get(C::NAME)?.create::<C>(context)
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("name", &self.name)
            .field("manufacturer", &self.manufacturer)
            .field("hw_version", &self.hw_version)
            .field("sw_version", &self.sw_version)
            .field("capabilities", &self.capabilities())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Driver`].
pub struct DriverBuilder {
    driver: Driver,
}

impl DriverBuilder {
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.driver.manufacturer = manufacturer.into();
        self
    }

    pub fn hw_version(mut self, hw_version: impl Into<String>) -> Self {
        self.driver.hw_version = hw_version.into();
        self
    }

    pub fn sw_version(mut self, sw_version: impl Into<String>) -> Self {
        self.driver.sw_version = sw_version.into();
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.driver.properties.insert(key.into(), value.into());
        self
    }

    /// Register a behaviour for capability `C`, replacing any earlier one.
    pub fn behaviour<C, F>(self, factory: F) -> Self
    where
        C: Capability,
        F: Fn(&BehaviourContext) -> Box<C::Behaviour> + Send + Sync + 'static,
    {
        self.erased_behaviour(ErasedFactory::from_fn::<C, F>(factory))
    }

    pub fn erased_behaviour(mut self, factory: ErasedFactory) -> Self {
        self.driver
            .behaviours
            .insert(factory.capability().to_owned(), factory);
        self
    }

    pub fn build(self) -> Driver {
        self.driver
    }
}
