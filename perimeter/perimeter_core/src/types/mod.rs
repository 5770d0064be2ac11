//! Data types shared by the Perimeter crates.

mod access;
mod content;

pub use access::{Actor, Permission};
pub use content::{Attachment, ContentItem, ContentKind, ContentStatus, FileData, HostEvent};
