mod audit;
mod engine;

pub use audit::{AuditEntry, AuditLog};
pub use engine::{CapabilityChecker, GrantFailure, ValidatedGrant};
