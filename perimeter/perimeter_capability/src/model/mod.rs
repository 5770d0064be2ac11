mod capability;

pub use capability::{Capability, CapabilityError, InclusionKey};
