//! In-memory host.
//!
//! [`InMemoryHost`] implements every collaborator trait over `DashMap`s. It
//! backs the test suites and the command-line tool, and is a reference for
//! what the traits expect from a real host.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::id::{ActorName, ContentId};
use crate::render::RenderContext;
use crate::traits::{
    AccessControl, ActorDirectory, ContentStore, EventPublisher, PropertyStore, Renderer,
    ResourceProvider,
};
use crate::types::{
    Actor, Attachment, ContentItem, ContentKind, ContentStatus, FileData, HostEvent, Permission,
};

const THUMBNAIL_CONTENT_TYPE: &str = "image/png";

struct StoredAttachment {
    meta: Attachment,
    data: Option<Vec<u8>>,
    thumbnail: Option<Vec<u8>>,
}

/// A host wiki held entirely in memory.
///
/// Permissions are explicit grants per item; a grant to `None` applies to
/// every actor including anonymous ones. Attachments share the permissions
/// of the item they are attached to.
pub struct InMemoryHost {
    contents: DashMap<ContentId, ContentItem>,

    /// Attachments keyed by owning item, all versions
    attachments: DashMap<ContentId, Vec<StoredAttachment>>,

    actors: DashMap<ActorName, Actor>,

    superusers: DashSet<ActorName>,

    grants: DashSet<(ContentId, Permission, Option<ActorName>)>,

    properties: DashMap<(ContentId, String), String>,

    resources: DashMap<(String, String), (String, Vec<u8>)>,

    events: Mutex<Vec<HostEvent>>,

    next_id: AtomicU64,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self {
            contents: DashMap::new(),
            attachments: DashMap::new(),
            actors: DashMap::new(),
            superusers: DashSet::new(),
            grants: DashSet::new(),
            properties: DashMap::new(),
            resources: DashMap::new(),
            events: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1000),
        }
    }

    fn allocate_id(&self) -> ContentId {
        loop {
            let id = ContentId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
            if !self.contents.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn add_actor(&self, name: ActorName) -> Actor {
        let actor = Actor::new(name.clone());
        self.actors.insert(name, actor.clone());
        actor
    }

    pub fn remove_actor(&self, name: &ActorName) {
        self.actors.remove(name);
        self.superusers.remove(name);
    }

    pub fn set_superuser(&self, name: &ActorName, superuser: bool) {
        if superuser {
            self.superusers.insert(name.clone());
        } else {
            self.superusers.remove(name);
        }
    }

    /// Store `item` under its own id, replacing any previous item.
    pub fn insert_content(&self, item: ContentItem) {
        self.contents.insert(item.id, item);
    }

    /// Create a page with a freshly allocated id.
    pub fn add_page(
        &self,
        space: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> ContentItem {
        let item = ContentItem::page(self.allocate_id(), space, title, body);
        self.insert_content(item.clone());
        item
    }

    pub fn set_body(&self, id: ContentId, body: impl Into<String>) {
        if let Some(mut item) = self.contents.get_mut(&id) {
            item.body = body.into();
        }
    }

    pub fn set_status(&self, id: ContentId, status: ContentStatus) {
        if let Some(mut item) = self.contents.get_mut(&id) {
            item.status = status;
        }
    }

    /// Remove an item together with its attachments and properties.
    pub fn remove_content(&self, id: ContentId) {
        self.contents.remove(&id);
        if let Some((_, attachments)) = self.attachments.remove(&id) {
            for stored in attachments {
                self.contents.remove(&stored.meta.id);
            }
        }
        self.properties.retain(|(content, _), _| *content != id);
    }

    /// Attach a new version of `file_name` to `owner`.
    pub fn add_attachment(
        &self,
        owner: ContentId,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Attachment> {
        let owner_item = self
            .contents
            .get(&owner)
            .map(|item| item.clone())
            .ok_or_else(|| Error::Content(format!("no content item {}", owner)))?;
        if !owner_item.kind.can_own_attachments() {
            return Err(Error::Content(format!(
                "content item {} cannot own attachments",
                owner
            )));
        }

        let file_name = file_name.into();
        let mut entries = self.attachments.entry(owner).or_default();
        let version = entries
            .iter()
            .filter(|stored| stored.meta.file_name == file_name)
            .map(|stored| stored.meta.version)
            .max()
            .unwrap_or(0)
            + 1;

        let meta = Attachment {
            id: self.allocate_id(),
            owner,
            file_name,
            content_type: content_type.into(),
            file_size: data.len() as u64,
            version,
            status: ContentStatus::Current,
        };
        self.contents
            .insert(meta.id, meta.to_content(owner_item.space.clone()));
        entries.push(StoredAttachment {
            meta: meta.clone(),
            data: Some(data),
            thumbnail: None,
        });
        Ok(meta)
    }

    pub fn set_thumbnail(&self, attachment: &Attachment, data: Vec<u8>) {
        self.update_attachment(attachment, |stored| stored.thumbnail = Some(data));
    }

    /// Drop the stored bytes of an attachment while keeping its metadata.
    pub fn discard_attachment_data(&self, attachment: &Attachment) {
        self.update_attachment(attachment, |stored| stored.data = None);
    }

    fn update_attachment(&self, attachment: &Attachment, f: impl FnOnce(&mut StoredAttachment)) {
        if let Some(mut entries) = self.attachments.get_mut(&attachment.owner) {
            if let Some(stored) = entries
                .iter_mut()
                .find(|stored| stored.meta.id == attachment.id)
            {
                f(stored);
            }
        }
    }

    pub fn grant(&self, actor: Option<&ActorName>, permission: Permission, content: ContentId) {
        self.grants.insert((content, permission, actor.cloned()));
    }

    pub fn revoke(&self, actor: Option<&ActorName>, permission: Permission, content: ContentId) {
        self.grants.remove(&(content, permission, actor.cloned()));
    }

    pub fn add_resource(
        &self,
        plugin_key: impl Into<String>,
        path: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) {
        self.resources
            .insert((plugin_key.into(), path.into()), (content_type.into(), data));
    }

    /// Every property stored on `content`, sorted by key.
    pub fn properties_of(&self, content: ContentId) -> Vec<(String, String)> {
        let mut properties: Vec<_> = self
            .properties
            .iter()
            .filter(|entry| entry.key().0 == content)
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect();
        properties.sort();
        properties
    }

    /// Events published so far, oldest first.
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().clone()
    }

    fn has_grant(&self, actor: Option<&Actor>, permission: Permission, content: ContentId) -> bool {
        if self.grants.contains(&(content, permission, None)) {
            return true;
        }
        match actor {
            Some(actor) if self.actors.contains_key(actor.name()) => self
                .grants
                .contains(&(content, permission, Some(actor.name().clone()))),
            _ => false,
        }
    }
}

impl ContentStore for InMemoryHost {
    fn get_by_id(&self, id: ContentId) -> Result<Option<ContentItem>> {
        Ok(self.contents.get(&id).map(|item| item.clone()))
    }

    fn get_by_title(&self, space: &str, title: &str) -> Result<Option<ContentItem>> {
        Ok(self
            .contents
            .iter()
            .find(|entry| {
                let item = entry.value();
                matches!(item.kind, ContentKind::Page | ContentKind::BlogPost)
                    && !item.is_deleted()
                    && item.space == space
                    && item.title == title
            })
            .map(|entry| entry.value().clone()))
    }

    fn get_attachment(
        &self,
        owner: &ContentItem,
        file_name: &str,
        version: Option<u32>,
    ) -> Result<Option<Attachment>> {
        let Some(entries) = self.attachments.get(&owner.id) else {
            return Ok(None);
        };
        let mut matching = entries
            .iter()
            .map(|stored| &stored.meta)
            .filter(|meta| meta.file_name == file_name);
        let found = match version {
            Some(version) => matching.find(|meta| meta.version == version),
            None => matching.max_by_key(|meta| meta.version),
        };
        Ok(found.cloned())
    }

    fn attachment_data(&self, attachment: &Attachment) -> Result<Option<FileData>> {
        Ok(self.attachments.get(&attachment.owner).and_then(|entries| {
            entries
                .iter()
                .find(|stored| stored.meta.id == attachment.id)
                .and_then(|stored| stored.data.clone())
                .map(|data| FileData::from_bytes(attachment.content_type.clone(), data))
        }))
    }

    fn thumbnail_data(&self, attachment: &Attachment) -> Result<Option<FileData>> {
        Ok(self.attachments.get(&attachment.owner).and_then(|entries| {
            entries
                .iter()
                .find(|stored| stored.meta.id == attachment.id)
                .and_then(|stored| stored.thumbnail.clone())
                .map(|data| FileData::from_bytes(THUMBNAIL_CONTENT_TYPE, data))
        }))
    }
}

impl AccessControl for InMemoryHost {
    fn has_permission(
        &self,
        actor: Option<&Actor>,
        permission: Permission,
        item: &ContentItem,
    ) -> bool {
        let governing = match item.kind {
            ContentKind::Attachment { owner } => owner,
            _ => item.id,
        };
        self.has_grant(actor, permission, governing)
    }

    fn is_superuser(&self, actor: &Actor) -> bool {
        self.superusers.contains(actor.name())
    }
}

impl ActorDirectory for InMemoryHost {
    fn get_actor_by_name(&self, name: &ActorName) -> Option<Actor> {
        self.actors.get(name).map(|actor| actor.clone())
    }
}

impl PropertyStore for InMemoryHost {
    fn get_text(&self, content: ContentId, key: &str) -> Result<Option<String>> {
        Ok(self
            .properties
            .get(&(content, key.to_string()))
            .map(|value| value.clone()))
    }

    fn set_text(&self, content: ContentId, key: &str, value: &str) -> Result<()> {
        if !self.contents.contains_key(&content) {
            return Err(Error::Property(format!("no content item {}", content)));
        }
        self.properties
            .insert((content, key.to_string()), value.to_string());
        Ok(())
    }
}

impl EventPublisher for InMemoryHost {
    fn publish(&self, event: HostEvent) {
        self.events.lock().push(event);
    }
}

impl ResourceProvider for InMemoryHost {
    fn resource(&self, plugin_key: &str, path: &str) -> Result<Option<FileData>> {
        Ok(self
            .resources
            .get(&(plugin_key.to_string(), path.to_string()))
            .map(|entry| {
                let (content_type, data) = entry.value();
                FileData::from_bytes(content_type.clone(), data.clone())
            }))
    }
}

/// Renderer that emits stored bodies unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn render(&self, body: &str, _ctx: &RenderContext) -> Result<String> {
        Ok(body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn name(value: &str) -> ActorName {
        ActorName::new(value).unwrap()
    }

    #[test]
    fn test_title_lookup_skips_trash_and_other_spaces() {
        let host = InMemoryHost::new();
        let page = host.add_page("DOC", "Home", "<p>hi</p>");

        assert_eq!(host.get_by_title("DOC", "Home").unwrap(), Some(page.clone()));
        assert_eq!(host.get_by_title("OTHER", "Home").unwrap(), None);

        host.set_status(page.id, ContentStatus::Deleted);
        assert_eq!(host.get_by_title("DOC", "Home").unwrap(), None);
        assert!(host.get_by_id(page.id).unwrap().unwrap().is_deleted());
    }

    #[test]
    fn test_attachment_versions() {
        let host = InMemoryHost::new();
        let page = host.add_page("DOC", "Home", "");
        let v1 = host
            .add_attachment(page.id, "a.txt", "text/plain", b"one".to_vec())
            .unwrap();
        let v2 = host
            .add_attachment(page.id, "a.txt", "text/plain", b"two!".to_vec())
            .unwrap();
        assert_eq!((v1.version, v2.version), (1, 2));

        let latest = host.get_attachment(&page, "a.txt", None).unwrap().unwrap();
        assert_eq!(latest, v2);
        let first = host
            .get_attachment(&page, "a.txt", Some(1))
            .unwrap()
            .unwrap();
        assert_eq!(first, v1);
        assert!(host.get_attachment(&page, "a.txt", Some(3)).unwrap().is_none());

        let mut data = String::new();
        host.attachment_data(&first)
            .unwrap()
            .unwrap()
            .body
            .read_to_string(&mut data)
            .unwrap();
        assert_eq!(data, "one");

        let attachment_item = host.get_by_id(v1.id).unwrap().unwrap();
        assert_eq!(attachment_item.kind, ContentKind::Attachment { owner: page.id });
    }

    #[test]
    fn test_attachments_inherit_owner_permissions() {
        let host = InMemoryHost::new();
        let alice = host.add_actor(name("alice"));
        let page = host.add_page("DOC", "Home", "");
        let attachment = host
            .add_attachment(page.id, "a.png", "image/png", vec![1, 2, 3])
            .unwrap();
        let item = attachment.to_content("DOC");

        assert!(!host.has_permission(Some(&alice), Permission::View, &item));
        host.grant(Some(alice.name()), Permission::View, page.id);
        assert!(host.has_permission(Some(&alice), Permission::View, &item));
        assert!(!host.has_permission(None, Permission::View, &item));

        host.grant(None, Permission::View, page.id);
        assert!(host.has_permission(None, Permission::View, &page));
    }

    #[test]
    fn test_removed_actor_loses_named_grants() {
        let host = InMemoryHost::new();
        let alice = host.add_actor(name("alice"));
        let page = host.add_page("DOC", "Home", "");
        host.grant(Some(alice.name()), Permission::View, page.id);

        host.remove_actor(alice.name());
        assert!(!host.has_permission(Some(&alice), Permission::View, &page));
        assert!(host.get_actor_by_name(alice.name()).is_none());
    }

    #[test]
    fn test_properties_require_content() {
        let host = InMemoryHost::new();
        let page = host.add_page("DOC", "Home", "");

        host.set_text(page.id, "k", "v").unwrap();
        assert_eq!(host.get_text(page.id, "k").unwrap(), Some("v".to_string()));
        assert!(host.set_text(ContentId::new(1), "k", "v").is_err());

        host.remove_content(page.id);
        assert!(host.properties_of(page.id).is_empty());
    }
}
