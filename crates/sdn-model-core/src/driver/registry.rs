// ── Driver registry ──
//
// Name and manufacturer/hardware/software lookup of drivers, and the
// construction of drivers from declarative definitions.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Driver;
use super::catalog::BehaviourCatalog;
use crate::error::ModelError;

/// Driver lookup as seen by entities that need to bind one.
pub trait DriverResolver: Send + Sync {
    /// Driver registered under `name`.
    fn driver(&self, name: &str) -> Option<Arc<Driver>>;

    /// Best driver for a device with the given identification.
    fn driver_for(
        &self,
        manufacturer: &str,
        hw_version: &str,
        sw_version: &str,
    ) -> Option<Arc<Driver>>;
}

/// Declarative driver description, typically loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverDefinition {
    pub name: String,
    /// Manufacturer pattern; a trailing `*` matches any suffix.
    pub manufacturer: String,
    pub hw_version: String,
    pub sw_version: String,
    /// Parent driver whose behaviours and properties are inherited.
    pub extends: Option<String>,
    /// Capability name → behaviour implementation name.
    pub behaviours: BTreeMap<String, String>,
    pub properties: BTreeMap<String, String>,
}

/// In-memory driver registry.
#[derive(Debug, Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, Arc<Driver>>,
    default_driver: Option<String>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a driver. Names must be unique.
    pub fn register(&mut self, driver: Driver) -> Result<(), ModelError> {
        if self.drivers.contains_key(driver.name()) {
            return Err(ModelError::invalid_argument(format!(
                "driver '{}' is already registered",
                driver.name()
            )));
        }
        self.drivers.insert(driver.name().to_owned(), Arc::new(driver));
        Ok(())
    }

    /// Driver used when no manufacturer match exists. Must already be
    /// registered.
    pub fn set_default_driver(&mut self, name: &str) -> Result<(), ModelError> {
        if !self.drivers.contains_key(name) {
            return Err(ModelError::invalid_argument(format!(
                "default driver '{name}' is not registered"
            )));
        }
        self.default_driver = Some(name.to_owned());
        Ok(())
    }

    pub fn default_driver(&self) -> Option<&str> {
        self.default_driver.as_deref()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Build a registry from definitions, resolving `extends` chains and
    /// binding implementation names through `catalog`.
    pub fn from_definitions(
        definitions: &[DriverDefinition],
        catalog: &BehaviourCatalog,
        default_driver: Option<&str>,
    ) -> Result<Self, ModelError> {
        let mut by_name: BTreeMap<&str, &DriverDefinition> = BTreeMap::new();
        for definition in definitions {
            if definition.name.is_empty() {
                return Err(ModelError::invalid_argument("driver definition without a name"));
            }
            if by_name.insert(&definition.name, definition).is_some() {
                return Err(ModelError::invalid_argument(format!(
                    "driver '{}' is defined more than once",
                    definition.name
                )));
            }
        }

        let mut registry = Self::new();
        for definition in definitions {
            let flat = flatten(definition, &by_name)?;
            registry.register(build_driver(&flat, catalog)?)?;
        }
        if let Some(name) = default_driver {
            registry.set_default_driver(name)?;
        }
        debug!(drivers = registry.len(), "driver registry built");
        Ok(registry)
    }
}

impl DriverResolver for DriverRegistry {
    fn driver(&self, name: &str) -> Option<Arc<Driver>> {
        self.drivers.get(name).cloned()
    }

    fn driver_for(
        &self,
        manufacturer: &str,
        hw_version: &str,
        sw_version: &str,
    ) -> Option<Arc<Driver>> {
        let mut best: Option<(u32, &Arc<Driver>)> = None;
        for driver in self.drivers.values() {
            if driver.manufacturer().is_empty() {
                continue;
            }
            let score = match_score(driver.manufacturer(), manufacturer)
                .zip(match_score(driver.hw_version(), hw_version))
                .zip(match_score(driver.sw_version(), sw_version))
                .map(|((m, h), s)| m + h + s);
            if let Some(score) = score {
                if best.is_none_or(|(top, _)| score > top) {
                    best = Some((score, driver));
                }
            }
        }

        best.map(|(_, driver)| Arc::clone(driver)).or_else(|| {
            self.default_driver
                .as_deref()
                .and_then(|name| self.driver(name))
        })
    }
}

/// Score of `pattern` against `value`: exact (case-insensitive) beats a
/// trailing-`*` prefix match, which beats an empty or bare `*` wildcard.
/// `None` when the pattern does not match.
fn match_score(pattern: &str, value: &str) -> Option<u32> {
    if pattern.is_empty() || pattern == "*" {
        return Some(0);
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        let matches = value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        return matches.then_some(1);
    }
    pattern.eq_ignore_ascii_case(value).then_some(2)
}

/// Collapse a definition and its ancestors into one; the child wins.
fn flatten<'a>(
    definition: &'a DriverDefinition,
    by_name: &BTreeMap<&'a str, &'a DriverDefinition>,
) -> Result<DriverDefinition, ModelError> {
    let mut chain = vec![definition];
    let mut seen: HashSet<&str> = HashSet::from([definition.name.as_str()]);
    let mut current = definition;
    while let Some(parent_name) = current.extends.as_deref() {
        let parent = by_name.get(parent_name).copied().ok_or_else(|| {
            ModelError::invalid_argument(format!(
                "driver '{}' extends unknown driver '{parent_name}'",
                current.name
            ))
        })?;
        if !seen.insert(parent_name) {
            return Err(ModelError::invalid_argument(format!(
                "driver '{}' has a cyclic extends chain",
                definition.name
            )));
        }
        chain.push(parent);
        current = parent;
    }

    let mut flat = DriverDefinition {
        name: definition.name.clone(),
        ..DriverDefinition::default()
    };
    for ancestor in chain.iter().rev() {
        for (field, value) in [
            (&mut flat.manufacturer, &ancestor.manufacturer),
            (&mut flat.hw_version, &ancestor.hw_version),
            (&mut flat.sw_version, &ancestor.sw_version),
        ] {
            if !value.is_empty() {
                field.clone_from(value);
            }
        }
        flat.behaviours.extend(ancestor.behaviours.clone());
        flat.properties.extend(ancestor.properties.clone());
    }
    Ok(flat)
}

fn build_driver(
    definition: &DriverDefinition,
    catalog: &BehaviourCatalog,
) -> Result<Driver, ModelError> {
    let mut builder = Driver::builder(&definition.name)
        .manufacturer(&definition.manufacturer)
        .hw_version(&definition.hw_version)
        .sw_version(&definition.sw_version);

    for (key, value) in &definition.properties {
        builder = builder.property(key, value);
    }
    for (capability, implementation) in &definition.behaviours {
        let factory = catalog.get(implementation).ok_or_else(|| {
            ModelError::invalid_argument(format!(
                "driver '{}': unknown behaviour implementation '{implementation}'",
                definition.name
            ))
        })?;
        if factory.capability() != capability {
            return Err(ModelError::invalid_argument(format!(
                "driver '{}': '{implementation}' implements {}, not {capability}",
                definition.name,
                factory.capability()
            )));
        }
        builder = builder.erased_behaviour(factory.clone());
    }
    Ok(builder.build())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::{BehaviourContext, Capability};

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct GreeterCapability;

    impl Capability for GreeterCapability {
        const NAME: &'static str = "Greeter";
        type Behaviour = dyn Greeter;
    }

    struct Fixed(&'static str);

    impl Greeter for Fixed {
        fn greet(&self) -> String {
            self.0.to_owned()
        }
    }

    fn catalog() -> BehaviourCatalog {
        let mut catalog = BehaviourCatalog::new();
        catalog.register::<GreeterCapability, _>("hello", |_: &BehaviourContext| {
            Box::new(Fixed("hello")) as Box<dyn Greeter>
        });
        catalog
    }

    fn definition(name: &str, manufacturer: &str) -> DriverDefinition {
        DriverDefinition {
            name: name.into(),
            manufacturer: manufacturer.into(),
            ..DriverDefinition::default()
        }
    }

    #[test]
    fn exact_match_beats_wildcard() {
        let mut registry = DriverRegistry::new();
        registry
            .register(Driver::builder("generic").manufacturer("Acme*").build())
            .unwrap();
        registry
            .register(
                Driver::builder("acme-x")
                    .manufacturer("Acme Networks")
                    .hw_version("X1")
                    .build(),
            )
            .unwrap();

        let found = registry.driver_for("acme networks", "X1", "2.0").unwrap();
        assert_eq!(found.name(), "acme-x");

        let found = registry.driver_for("Acme Labs", "Y", "1").unwrap();
        assert_eq!(found.name(), "generic");
    }

    #[test]
    fn falls_back_to_default_driver() {
        let mut registry = DriverRegistry::new();
        registry.register(Driver::builder("default").build()).unwrap();
        assert!(registry.driver_for("Nobody", "", "").is_none());

        registry.set_default_driver("default").unwrap();
        assert_eq!(registry.driver_for("Nobody", "", "").unwrap().name(), "default");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = DriverRegistry::new();
        registry.register(Driver::builder("a").build()).unwrap();
        assert!(matches!(
            registry.register(Driver::builder("a").build()),
            Err(ModelError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn definitions_inherit_from_parents() {
        let mut parent = definition("base", "Acme*");
        parent
            .behaviours
            .insert("Greeter".into(), "hello".into());
        parent.properties.insert("mtu".into(), "1500".into());

        let mut child = definition("child", "");
        child.extends = Some("base".into());
        child.hw_version = "X1".into();
        child.properties.insert("mtu".into(), "9000".into());

        let registry =
            DriverRegistry::from_definitions(&[child, parent], &catalog(), None).unwrap();
        let child = registry.driver("child").unwrap();
        assert_eq!(child.manufacturer(), "Acme*");
        assert_eq!(child.hw_version(), "X1");
        assert_eq!(child.property("mtu"), Some("9000"));
        assert!(child.supports::<GreeterCapability>());
    }

    #[test]
    fn definitions_reject_cycles_and_unknown_parents() {
        let mut a = definition("a", "");
        a.extends = Some("b".into());
        let mut b = definition("b", "");
        b.extends = Some("a".into());
        assert!(DriverRegistry::from_definitions(&[a, b], &catalog(), None).is_err());

        let mut orphan = definition("orphan", "");
        orphan.extends = Some("missing".into());
        assert!(DriverRegistry::from_definitions(&[orphan], &catalog(), None).is_err());
    }

    #[test]
    fn definitions_reject_unknown_or_mismatched_implementations() {
        let mut unknown = definition("u", "");
        unknown.behaviours.insert("Greeter".into(), "nope".into());
        assert!(DriverRegistry::from_definitions(&[unknown], &catalog(), None).is_err());

        let mut mismatched = definition("m", "");
        mismatched
            .behaviours
            .insert("PortDiscovery".into(), "hello".into());
        assert!(DriverRegistry::from_definitions(&[mismatched], &catalog(), None).is_err());
    }

    #[test]
    fn behaviour_built_from_definition_is_callable() {
        let mut def = definition("d", "");
        def.behaviours.insert("Greeter".into(), "hello".into());
        let registry = DriverRegistry::from_definitions(&[def], &catalog(), Some("d")).unwrap();
        let driver = registry.driver("d").unwrap();

        let data = crate::driver::DriverData::new(
            Arc::clone(&driver),
            crate::model::DeviceId::NONE.into(),
        );
        let greeter = driver
            .create::<GreeterCapability>(&BehaviourContext::data(data))
            .unwrap();
        assert_eq!(greeter.greet(), "hello");
    }
}
