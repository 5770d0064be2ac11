//! # Perimeter Capability
//!
//! A secure include lets every viewer of a host document see a target item
//! the viewer may not otherwise be permitted to see, for as long as the
//! author who set the include up (the granter) can still see it.
//!
//! This crate holds the delegation record behind that:
//!
//! - **Model**: [`Capability`], the `{granter, target}` record, and
//!   [`InclusionKey`], the `(host, inclusion id)` pair it belongs to
//! - **Store**: [`CapabilityStore`], persisting one record per key as a text
//!   property of the host item
//! - **Check**: [`CapabilityChecker`], re-deriving trust from current access
//!   control state every time a record is used, with an optional [`AuditLog`]
//!
//! Records are never cached. Revoking the granter's access to the target
//! disables every include the granter set up, without touching the records.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use perimeter_capability::{Capability, CapabilityStore, PropertyCapabilityStore};
//! use perimeter_core::{ActorName, InMemoryHost, InclusionId};
//!
//! let host = Arc::new(InMemoryHost::new());
//! let page = host.add_page("DOC", "Host", "");
//! let store = PropertyCapabilityStore::with_default_namespace(host.clone());
//!
//! let inclusion = InclusionId::new("x").unwrap();
//! let capability = Capability::new(ActorName::new("alice").unwrap(), page.id);
//! store.save(page.id, &inclusion, &capability).unwrap();
//!
//! assert_eq!(store.load(page.id, &inclusion).unwrap(), Some(capability));
//! ```

pub mod check;
pub mod model;
pub mod store;

pub use check::{AuditEntry, AuditLog, CapabilityChecker, GrantFailure, ValidatedGrant};
pub use model::{Capability, CapabilityError, InclusionKey};
pub use store::{CapabilityStore, InMemoryCapabilityStore, PropertyCapabilityStore};
