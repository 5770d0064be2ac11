mod in_memory;
mod property;

use perimeter_core::id::{ContentId, InclusionId};

use crate::model::{Capability, CapabilityError};

/// Persistence of one capability per `(host, inclusion id)` pair.
///
/// There is no locking: concurrent saves for the same pair race and the last
/// write wins. There is no delete; records disappear with their host item.
pub trait CapabilityStore: Send + Sync {
    /// Store `capability`, replacing any previous record for the pair.
    fn save(
        &self,
        host: ContentId,
        inclusion: &InclusionId,
        capability: &Capability,
    ) -> Result<(), CapabilityError>;

    /// Read the record for the pair.
    ///
    /// Returns `Ok(None)` when no record exists or the stored record cannot
    /// be decoded. Storage failures are errors.
    fn load(
        &self,
        host: ContentId,
        inclusion: &InclusionId,
    ) -> Result<Option<Capability>, CapabilityError>;
}

pub use in_memory::InMemoryCapabilityStore;
pub use property::PropertyCapabilityStore;
