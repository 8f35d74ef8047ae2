// ── Driver service ──
//
// Holds the driver resolver the hosting process installs at start-up.
// Handles are cheap to clone and share one installation slot.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::info;

use super::registry::DriverResolver;
use crate::error::ModelError;

/// Install-once access point for driver resolution.
///
/// Every projection goes through a `DriverService`; until a resolver is
/// installed, projections fail with [`ModelError::NotReady`].
#[derive(Clone, Default)]
pub struct DriverService {
    slot: Arc<OnceLock<Arc<dyn DriverResolver>>>,
}

impl DriverService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service that is ready from the start.
    pub fn with_resolver(resolver: Arc<dyn DriverResolver>) -> Self {
        let service = Self::new();
        // A fresh slot is always empty.
        let _ = service.slot.set(resolver);
        service
    }

    /// Install the resolver. Only the first call succeeds.
    pub fn install(&self, resolver: Arc<dyn DriverResolver>) -> Result<(), ModelError> {
        self.slot
            .set(resolver)
            .map_err(|_| ModelError::invalid_state("driver resolver is already installed"))?;
        info!("driver resolver installed");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn resolver(&self) -> Result<&Arc<dyn DriverResolver>, ModelError> {
        self.slot.get().ok_or_else(|| ModelError::NotReady {
            component: "driver service".into(),
        })
    }
}

impl fmt::Debug for DriverService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverService")
            .field("ready", &self.is_ready())
            .finish()
    }
}
