use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

use crate::id::{ActorName, ContentId};

/// Kind of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ContentKind {
    Page,
    BlogPost,
    Comment,
    /// A file attached to another content item
    Attachment { owner: ContentId },
}

impl ContentKind {
    /// Whether files can be attached to items of this kind.
    pub fn can_own_attachments(&self) -> bool {
        matches!(self, ContentKind::Page | ContentKind::BlogPost)
    }

    /// Whether items of this kind carry a renderable body.
    pub fn has_body(&self) -> bool {
        !matches!(self, ContentKind::Attachment { .. })
    }
}

/// Lifecycle status of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    #[default]
    Current,
    Draft,
    /// In the trash; the id still resolves
    Deleted,
}

/// A content item as reported by the host content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub kind: ContentKind,
    #[serde(default)]
    pub status: ContentStatus,
    /// Key of the space holding the item
    pub space: String,
    pub title: String,
    /// Body in the host's storage markup
    #[serde(default)]
    pub body: String,
}

impl ContentItem {
    pub fn new(
        id: ContentId,
        kind: ContentKind,
        space: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            status: ContentStatus::Current,
            space: space.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn page(
        id: ContentId,
        space: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::new(id, ContentKind::Page, space, title, body)
    }

    pub fn is_deleted(&self) -> bool {
        self.status == ContentStatus::Deleted
    }
}

impl fmt::Display for ContentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.space, self.title, self.id)
    }
}

/// Metadata of one version of an attached file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: ContentId,
    /// The content item the file is attached to
    pub owner: ContentId,
    pub file_name: String,
    pub content_type: String,
    pub file_size: u64,
    pub version: u32,
    #[serde(default)]
    pub status: ContentStatus,
}

impl Attachment {
    /// The attachment viewed as a content item, for access checks and link
    /// resolution results.
    pub fn to_content(&self, space: impl Into<String>) -> ContentItem {
        ContentItem {
            id: self.id,
            kind: ContentKind::Attachment { owner: self.owner },
            status: self.status,
            space: space.into(),
            title: self.file_name.clone(),
            body: String::new(),
        }
    }

    /// Whether the file would be interpreted as a page by a browser.
    pub fn is_html(&self) -> bool {
        let name = self.file_name.to_ascii_lowercase();
        name.ends_with("htm") || name.ends_with("html") || self.content_type == "text/html"
    }
}

/// An open file ready to be streamed.
pub struct FileData {
    pub content_type: String,
    pub length: u64,
    pub body: Box<dyn Read + Send>,
}

impl FileData {
    pub fn from_bytes(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            length: bytes.len() as u64,
            body: Box::new(std::io::Cursor::new(bytes)),
        }
    }
}

impl fmt::Debug for FileData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileData")
            .field("content_type", &self.content_type)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// Events Perimeter publishes back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// An attachment was streamed through a delegated path
    AttachmentViewed {
        attachment: ContentId,
        owner: ContentId,
        viewer: Option<ActorName>,
    },
}
