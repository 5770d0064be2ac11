//! # Perimeter Core
//!
//! `perimeter_core` provides the building blocks shared by every Perimeter
//! crate: typed identifiers, the content and access domain types, the traits
//! through which the host wiki is consulted, and configuration.
//!
//! Perimeter never owns content, identities or access decisions. It reads
//! them from the host through the traits in [`traits`]:
//!
//! - **ContentStore**: pages, blog posts, comments and their attachments
//! - **AccessControl**: `has_permission(actor, action, item)` decisions
//! - **ActorDirectory**: actors by name
//! - **PropertyStore**: text properties attached to a content item
//! - **Renderer**: turns stored markup into HTML
//!
//! The [`actor::CurrentActor`] cell carries the ambient identity of a request
//! and can be swapped for the duration of a closure with
//! [`actor::CurrentActor::run_as`].
//!
//! ## Crate Structure
//!
//! - **error**: Error types
//! - **id**: Strongly-typed identifiers
//! - **types**: Content and access data structures
//! - **traits**: Host collaborator interfaces
//! - **render**: The per-render context handed to the host renderer
//! - **memory**: An in-memory host implementing every collaborator trait
//! - **utils**: Configuration and logging helpers

pub mod actor;
pub mod error;
pub mod id;
pub mod memory;
pub mod render;
pub mod traits;
pub mod types;
pub mod utils;

pub use actor::{ActorScope, CurrentActor};
pub use error::{Error, Result};
pub use id::{ActorName, ContentId, InclusionId};
pub use memory::{InMemoryHost, PlainRenderer};
pub use render::{PageContext, RenderContext, RequestParams};
pub use traits::{
    AccessControl, ActorDirectory, ContentStore, EventPublisher, PropertyStore, Renderer,
    ResourceProvider,
};
pub use types::{Actor, Attachment, ContentItem, ContentKind, ContentStatus, FileData, HostEvent, Permission};
pub use utils::{LogLevel, PerimeterConfig};
