// ── Entity base ──
//
// Every entity carries the provider that last wrote it, its resolved
// annotations, and a memoized driver binding. Provider and annotations
// are fixed at construction; the binding is derived from them on first
// projection and computed at most once.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::{debug, warn};

use super::annotation_keys::AnnotationKeys;
use super::annotations::Annotations;
use super::entity_id::ElementId;
use super::provider::ProviderId;
use crate::driver::{
    BehaviourContext, Capability, CapabilityFamily, Driver, DriverData, DriverResolver,
    DriverService, HandlerContext,
};
use crate::error::ModelError;

/// Entity carrying annotations.
pub trait Annotated {
    fn annotations(&self) -> &Annotations;
}

/// Entity attributed to a provider.
pub trait Provided {
    fn provider_id(&self) -> &ProviderId;
}

/// Provider, annotations and driver binding shared by all entities.
#[derive(Clone)]
pub struct ModelBase {
    provider_id: ProviderId,
    annotations: Annotations,
    driver: OnceLock<Option<Arc<Driver>>>,
}

impl ModelBase {
    pub fn new(provider_id: ProviderId, annotations: Annotations) -> Self {
        Self {
            provider_id,
            annotations,
            driver: OnceLock::new(),
        }
    }

    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Driver bound so far, without triggering resolution.
    pub fn bound_driver(&self) -> Option<&Arc<Driver>> {
        self.driver.get().and_then(Option::as_ref)
    }
}

impl fmt::Debug for ModelBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBase")
            .field("provider_id", &self.provider_id)
            .field("annotations", &self.annotations)
            .field("driver", &self.bound_driver().map(|d| d.name()))
            .finish()
    }
}

impl Serialize for ModelBase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ModelBase", 2)?;
        state.serialize_field("provider_id", &self.provider_id)?;
        state.serialize_field("annotations", &self.annotations)?;
        state.end()
    }
}

/// Resolve the driver named by the `driver` annotation.
///
/// A name the resolver does not know is logged and treated as unbound.
pub fn driver_from_annotations(
    annotations: &Annotations,
    resolver: &dyn DriverResolver,
    entity: &dyn fmt::Display,
) -> Option<Arc<Driver>> {
    let name = annotations.value(AnnotationKeys::DRIVER)?;
    let driver = resolver.driver(name);
    if driver.is_none() {
        warn!(driver = name, %entity, "driver not found; entity stays unbound");
    }
    driver
}

/// Entity that can be projected onto driver capabilities.
pub trait Projectable: Annotated + Provided {
    /// Base holding the memoized binding.
    fn model_base(&self) -> &ModelBase;

    /// Element identity handed to behaviours.
    fn element_id(&self) -> ElementId;

    /// Human-readable description used in errors and logs.
    fn describe(&self) -> String;

    /// Driver lookup strategy. The default honours the `driver`
    /// annotation only.
    fn locate_driver(&self, resolver: &dyn DriverResolver) -> Option<Arc<Driver>> {
        driver_from_annotations(self.annotations(), resolver, &self.describe())
    }

    /// The bound driver, resolving and memoizing it on first use.
    fn driver(&self, drivers: &DriverService) -> Result<Option<Arc<Driver>>, ModelError> {
        let resolver = drivers.resolver()?;
        let bound = self.model_base().driver.get_or_init(|| {
            let driver = self.locate_driver(resolver.as_ref());
            debug!(
                entity = %self.describe(),
                driver = driver.as_ref().map(|d| d.name()),
                "driver bound"
            );
            driver
        });
        Ok(bound.clone())
    }

    /// Can this entity be viewed as `C`?
    fn supports<C: Capability>(&self, drivers: &DriverService) -> Result<bool, ModelError>
    where
        Self: Sized,
    {
        Ok(self
            .driver(drivers)?
            .is_some_and(|driver| driver.supports::<C>()))
    }

    /// View this entity as data-family capability `C`.
    fn project<C: Capability>(&self, drivers: &DriverService) -> Result<Box<C::Behaviour>, ModelError>
    where
        Self: Sized,
    {
        if C::FAMILY != CapabilityFamily::Data {
            return Err(ModelError::unsupported(C::NAME, self.describe()));
        }
        let driver = self.bound_for::<C>(drivers)?;
        let data = DriverData::new(Arc::clone(&driver), self.element_id());
        driver
            .create::<C>(&BehaviourContext::data(data))
            .ok_or_else(|| ModelError::unsupported(C::NAME, self.describe()))
    }

    /// View this entity as handler-family capability `C`, bound to `context`.
    fn project_handler<C: Capability>(
        &self,
        drivers: &DriverService,
        context: HandlerContext,
    ) -> Result<Box<C::Behaviour>, ModelError>
    where
        Self: Sized,
    {
        if C::FAMILY != CapabilityFamily::Handler {
            return Err(ModelError::unsupported(C::NAME, self.describe()));
        }
        let driver = self.bound_for::<C>(drivers)?;
        let data = DriverData::new(Arc::clone(&driver), self.element_id());
        driver
            .create::<C>(&BehaviourContext::handler(data, context))
            .ok_or_else(|| ModelError::unsupported(C::NAME, self.describe()))
    }

    #[doc(hidden)]
    fn bound_for<C: Capability>(&self, drivers: &DriverService) -> Result<Arc<Driver>, ModelError>
    where
        Self: Sized,
    {
        self.driver(drivers)?
            .filter(|driver| driver.supports::<C>())
            .ok_or_else(|| ModelError::unsupported(C::NAME, self.describe()))
    }
}
