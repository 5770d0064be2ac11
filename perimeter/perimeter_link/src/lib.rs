//! # Perimeter Link
//!
//! Resolves the link text an author types into a concrete content item:
//!
//! ```text
//! LinkExpression := [Space ':'] Title ['^' AttachmentName] ['#' Anchor]
//!                 | '$' NumericId
//! ```
//!
//! The result is only returned when the requesting actor may view it; an
//! existing item the actor cannot see is indistinguishable from a missing one.

mod resolver;
mod title;

pub use resolver::{LinkParts, LinkResolver};
pub use title::is_valid_title;

/// Separates a space key from a title; the first one binds.
pub const SPACE_SEPARATOR: char = ':';

/// Separates a title from an attachment name; the last one binds.
pub const ATTACHMENT_SEPARATOR: char = '^';

/// Separates a title from an anchor; the last one binds.
pub const ANCHOR_SEPARATOR: char = '#';

/// Prefix of an absolute content id.
pub const ID_PREFIX: char = '$';
