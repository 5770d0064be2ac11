use std::str::FromStr;
use std::sync::Arc;

use bitflags::bitflags;
use tracing::{debug, trace};

use perimeter_core::error::Result;
use perimeter_core::id::ContentId;
use perimeter_core::traits::{AccessControl, ContentStore};
use perimeter_core::types::{Actor, ContentItem, Permission};

use crate::title::is_valid_title;
use crate::{ANCHOR_SEPARATOR, ATTACHMENT_SEPARATOR, ID_PREFIX, SPACE_SEPARATOR};

bitflags! {
    /// Qualifiers already split off in the current resolution chain.
    ///
    /// Each qualifier is split off at most once, which bounds the recursion
    /// depth even for titles containing separator characters.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LinkParts: u8 {
        const ANCHOR = 0b001;
        const ATTACHMENT_NAME = 0b010;
        const SPACE_KEY = 0b100;
    }
}

/// Turns link text into a content item the requesting actor can view.
pub struct LinkResolver {
    content: Arc<dyn ContentStore>,
    access: Arc<dyn AccessControl>,
}

impl LinkResolver {
    pub fn new(content: Arc<dyn ContentStore>, access: Arc<dyn AccessControl>) -> Self {
        Self { content, access }
    }

    /// Resolve `link` relative to `space` on behalf of `actor`.
    ///
    /// Returns `Ok(None)` both when nothing matches and when the match is not
    /// viewable by `actor`.
    pub fn resolve(
        &self,
        space: &str,
        link: &str,
        actor: Option<&Actor>,
    ) -> Result<Option<ContentItem>> {
        let Some(content) = self.find(space, link, LinkParts::empty())? else {
            debug!(space, link, "link did not resolve");
            return Ok(None);
        };

        if self
            .access
            .has_permission(actor, Permission::View, &content)
        {
            Ok(Some(content))
        } else {
            debug!(space, link, content = %content.id, "link target not viewable by actor");
            Ok(None)
        }
    }

    fn find(&self, space: &str, link: &str, processed: LinkParts) -> Result<Option<ContentItem>> {
        trace!(space, link, ?processed, "resolving link");

        if is_valid_title(link) {
            if let Some(content) = self.content.get_by_title(space, link)? {
                return Ok(Some(content));
            }
        }

        if let Some(id) = link.strip_prefix(ID_PREFIX) {
            // A malformed id is not an error; the remaining rules still apply.
            if let Ok(id) = ContentId::from_str(id) {
                if let Some(content) = self.content.get_by_id(id)? {
                    return Ok(Some(content));
                }
            }
        }

        if !processed.contains(LinkParts::ANCHOR) {
            if let Some((page, _anchor)) = link.rsplit_once(ANCHOR_SEPARATOR) {
                if let Some(content) = self.find(space, page, processed | LinkParts::ANCHOR)? {
                    return Ok(Some(content));
                }
            }
        }

        if !processed.contains(LinkParts::ATTACHMENT_NAME) {
            if let Some((page, attachment_name)) = link.rsplit_once(ATTACHMENT_SEPARATOR) {
                if let Some(owner) =
                    self.find(space, page, processed | LinkParts::ATTACHMENT_NAME)?
                {
                    if owner.kind.can_own_attachments() {
                        if let Some(attachment) =
                            self.content.get_attachment(&owner, attachment_name, None)?
                        {
                            return Ok(Some(attachment.to_content(owner.space.clone())));
                        }
                    }
                }
            }
        }

        if !processed.contains(LinkParts::SPACE_KEY) {
            if let Some((space, title)) = link.split_once(SPACE_SEPARATOR) {
                if let Some(content) = self.find(space, title, processed | LinkParts::SPACE_KEY)? {
                    return Ok(Some(content));
                }
            }
        }

        Ok(None)
    }
}
