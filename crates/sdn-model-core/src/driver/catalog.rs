// ── Behaviour catalog ──
//
// Maps implementation names (as written in driver definitions) to the
// factories compiled into the process.

use std::collections::HashMap;

use super::capability::{BehaviourContext, Capability, ErasedFactory};

/// Implementation name → factory.
#[derive(Debug, Clone, Default)]
pub struct BehaviourCatalog {
    implementations: HashMap<String, ErasedFactory>,
}

impl BehaviourCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` as implementation `name` of capability `C`.
    pub fn register<C, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        C: Capability,
        F: Fn(&BehaviourContext) -> Box<C::Behaviour> + Send + Sync + 'static,
    {
        self.implementations
            .insert(name.into(), ErasedFactory::from_fn::<C, F>(factory));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ErasedFactory> {
        self.implementations.get(name)
    }

    pub fn len(&self) -> usize {
        self.implementations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implementations.is_empty()
    }
}
