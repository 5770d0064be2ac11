//! Interfaces to the host wiki.
//!
//! Perimeter consumes these; the host (or [`crate::memory::InMemoryHost`])
//! implements them.

mod host;

pub use host::{
    AccessControl, ActorDirectory, ContentStore, EventPublisher, PropertyStore, Renderer,
    ResourceProvider,
};
