use crate::error::Result;
use crate::id::{ActorName, ContentId};
use crate::render::RenderContext;
use crate::types::{Actor, Attachment, ContentItem, FileData, HostEvent, Permission};

/// Read access to the host's content items and attachments.
pub trait ContentStore: Send + Sync {
    /// Look up any content item by id, including trashed ones.
    fn get_by_id(&self, id: ContentId) -> Result<Option<ContentItem>>;

    /// Look up a page or blog post by space key and exact title.
    fn get_by_title(&self, space: &str, title: &str) -> Result<Option<ContentItem>>;

    /// Look up a file attached to `owner`. `None` selects the latest version.
    fn get_attachment(
        &self,
        owner: &ContentItem,
        file_name: &str,
        version: Option<u32>,
    ) -> Result<Option<Attachment>>;

    /// Open the data of an attachment, or `None` if the data is unavailable.
    fn attachment_data(&self, attachment: &Attachment) -> Result<Option<FileData>>;

    /// Open the thumbnail image of an attachment, if one exists.
    fn thumbnail_data(&self, attachment: &Attachment) -> Result<Option<FileData>>;
}

/// The host's access-control decision engine.
pub trait AccessControl: Send + Sync {
    /// Whether `actor` (`None` for anonymous) may perform `permission` on `item`.
    fn has_permission(&self, actor: Option<&Actor>, permission: Permission, item: &ContentItem)
        -> bool;

    fn is_superuser(&self, actor: &Actor) -> bool;
}

/// The host's identity store.
pub trait ActorDirectory: Send + Sync {
    fn get_actor_by_name(&self, name: &ActorName) -> Option<Actor>;
}

/// Text properties scoped to a content item.
pub trait PropertyStore: Send + Sync {
    fn get_text(&self, content: ContentId, key: &str) -> Result<Option<String>>;

    fn set_text(&self, content: ContentId, key: &str, value: &str) -> Result<()>;
}

/// The host rendering engine.
///
/// Implementations that perform nested permission checks must read the
/// acting identity from [`RenderContext::current_actor`].
pub trait Renderer: Send + Sync {
    fn render(&self, body: &str, ctx: &RenderContext) -> Result<String>;
}

/// Sink for events Perimeter reports back to the host.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: HostEvent);
}

/// Static resources shipped with host plugins.
pub trait ResourceProvider: Send + Sync {
    fn resource(&self, plugin_key: &str, path: &str) -> Result<Option<FileData>>;
}
