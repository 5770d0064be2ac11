//! # Perimeter Include
//!
//! The secure include directive. Each inclusion on a host document is named
//! by its `id` parameter and moves through three states:
//!
//! - no capability, actor cannot edit the host: renders nothing
//! - no capability, actor can edit the host: renders a form asking for a
//!   link, and stores a capability when a resolvable link is submitted
//! - capability stored: re-validates it and renders the target as the
//!   granter, with the target's file URLs routed through the delegated
//!   download paths
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use perimeter_capability::PropertyCapabilityStore;
//! use perimeter_core::{
//!     ActorName, CurrentActor, InMemoryHost, Permission, PerimeterConfig, PlainRenderer,
//!     RenderContext,
//! };
//! use perimeter_include::{MacroParameters, SecureInclude};
//!
//! let host = Arc::new(InMemoryHost::new());
//! let reader = host.add_actor(ActorName::new("reader").unwrap());
//! let page = host.add_page("DOC", "Host", "");
//! host.grant(Some(reader.name()), Permission::View, page.id);
//!
//! let include = SecureInclude::new(
//!     host.clone(),
//!     host.clone(),
//!     host.clone(),
//!     Arc::new(PropertyCapabilityStore::with_default_namespace(host.clone())),
//!     Arc::new(PlainRenderer),
//!     PerimeterConfig::default(),
//! );
//!
//! // Nothing is granted yet and the reader cannot edit the page.
//! let ctx = RenderContext::new(page, Arc::new(CurrentActor::new(Some(reader))));
//! let params = MacroParameters::new().with("id", "plans");
//! assert_eq!(include.execute(&params, "", &ctx).unwrap(), "");
//! ```

pub mod error;
pub mod form;
mod legacy;
mod orchestrator;
pub mod params;
pub mod rewrite;

pub use error::IncludeError;
pub use legacy::LegacySecureInclude;
pub use orchestrator::{InclusionState, SecureInclude};
pub use params::MacroParameters;
pub use rewrite::DelegatedUrls;
