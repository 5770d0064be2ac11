use dashmap::DashMap;

use perimeter_core::id::{ContentId, InclusionId};

use super::CapabilityStore;
use crate::model::{Capability, CapabilityError, InclusionKey};

/// A capability store kept in a `DashMap`, for hosts without a property
/// store and for tests.
#[derive(Default)]
pub struct InMemoryCapabilityStore {
    capabilities: DashMap<InclusionKey, Capability>,
}

impl InMemoryCapabilityStore {
    pub fn new() -> Self {
        Self {
            capabilities: DashMap::new(),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl CapabilityStore for InMemoryCapabilityStore {
    fn save(
        &self,
        host: ContentId,
        inclusion: &InclusionId,
        capability: &Capability,
    ) -> Result<(), CapabilityError> {
        self.capabilities.insert(
            InclusionKey::new(host, inclusion.clone()),
            capability.clone(),
        );
        Ok(())
    }

    fn load(
        &self,
        host: ContentId,
        inclusion: &InclusionId,
    ) -> Result<Option<Capability>, CapabilityError> {
        Ok(self
            .capabilities
            .get(&InclusionKey::new(host, inclusion.clone()))
            .map(|entry| entry.value().clone()))
    }
}
