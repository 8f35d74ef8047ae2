// ── Capabilities and behaviour factories ──
//
// A capability is a named, typed view an entity can be projected onto.
// Drivers carry one factory per supported capability; factories are
// stored type-erased and recovered by downcasting to the capability's
// concrete factory type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::Driver;
use crate::error::ModelError;
use crate::model::{DeviceId, ElementId};

/// How a capability binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityFamily {
    /// Bound against the entity's own identity and driver data.
    Data,
    /// Bound against a caller-supplied request context, for issuing
    /// commands against an immutable entity.
    Handler,
}

/// A projection target.
///
/// ```ignore
/// trait PortDiscovery: Send + Sync {
///     fn discover_ports(&self) -> Vec<PortNumber>;
/// }
///
/// struct PortDiscoveryCapability;
///
/// impl Capability for PortDiscoveryCapability {
///     const NAME: &'static str = "PortDiscovery";
///     type Behaviour = dyn PortDiscovery;
/// }
/// ```
pub trait Capability: 'static {
    /// Name used by driver definitions to refer to this capability.
    const NAME: &'static str;

    const FAMILY: CapabilityFamily = CapabilityFamily::Data;

    /// The view handed back by a projection, usually a trait object.
    type Behaviour: ?Sized + Send + Sync + 'static;
}

/// Constructor for a capability's behaviour.
pub type BehaviourFactory<C> =
    Arc<dyn Fn(&BehaviourContext) -> Box<<C as Capability>::Behaviour> + Send + Sync>;

// ── Contexts ────────────────────────────────────────────────────────

/// Driver-side view of the entity a behaviour is created for.
#[derive(Debug, Clone)]
pub struct DriverData {
    driver: Arc<Driver>,
    element_id: ElementId,
}

impl DriverData {
    pub fn new(driver: Arc<Driver>, element_id: ElementId) -> Self {
        Self { driver, element_id }
    }

    pub fn driver(&self) -> &Arc<Driver> {
        &self.driver
    }

    pub fn element_id(&self) -> &ElementId {
        &self.element_id
    }

    pub fn device_id(&self) -> Result<&DeviceId, ModelError> {
        self.element_id.as_device().ok_or_else(|| {
            ModelError::invalid_state(format!("driver data for {} has no device", self.element_id))
        })
    }

    /// Driver property lookup.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.driver.property(key)
    }
}

/// Request-scoped state a handler behaviour is bound to (a session, a
/// service directory, a transaction).
#[derive(Clone)]
pub struct HandlerContext {
    inner: Arc<dyn Any + Send + Sync>,
}

impl HandlerContext {
    pub fn new<T: Any + Send + Sync>(context: T) -> Self {
        Self {
            inner: Arc::new(context),
        }
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext").finish_non_exhaustive()
    }
}

/// Everything a factory gets to build a behaviour.
#[derive(Debug, Clone)]
pub struct BehaviourContext {
    data: DriverData,
    handler: Option<HandlerContext>,
}

impl BehaviourContext {
    pub(crate) fn data(data: DriverData) -> Self {
        Self {
            data,
            handler: None,
        }
    }

    pub(crate) fn handler(data: DriverData, context: HandlerContext) -> Self {
        Self {
            data,
            handler: Some(context),
        }
    }

    pub fn driver_data(&self) -> &DriverData {
        &self.data
    }

    /// Present only for handler-family capabilities.
    pub fn handler_context(&self) -> Option<&HandlerContext> {
        self.handler.as_ref()
    }
}

// ── Type-erased factories ───────────────────────────────────────────

/// A behaviour factory with its capability type erased.
#[derive(Clone)]
pub struct ErasedFactory {
    capability: &'static str,
    factory: Arc<dyn Any + Send + Sync>,
}

impl ErasedFactory {
    pub fn new<C: Capability>(factory: BehaviourFactory<C>) -> Self {
        Self {
            capability: C::NAME,
            factory: Arc::new(factory),
        }
    }

    pub fn from_fn<C, F>(f: F) -> Self
    where
        C: Capability,
        F: Fn(&BehaviourContext) -> Box<C::Behaviour> + Send + Sync + 'static,
    {
        Self::new::<C>(Arc::new(f))
    }

    pub fn capability(&self) -> &'static str {
        self.capability
    }

    /// True if this factory produces behaviours for `C`.
    pub fn is<C: Capability>(&self) -> bool {
        self.factory.is::<BehaviourFactory<C>>()
    }

    pub(crate) fn create<C: Capability>(&self, context: &BehaviourContext) -> Option<Box<C::Behaviour>> {
        self.factory
            .downcast_ref::<BehaviourFactory<C>>()
            .map(|factory| factory(context))
    }
}

impl fmt::Debug for ErasedFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedFactory")
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}
