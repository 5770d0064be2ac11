//! Site fixtures.
//!
//! A fixture is a TOML document describing the actors, pages, attachments,
//! permissions and stored grants of a small wiki. It is loaded into an
//! [`InMemoryHost`] for the commands to run against.
//!
//! ```toml
//! [[actors]]
//! name = "author"
//!
//! [[pages]]
//! space = "SEC"
//! title = "Plans"
//! body = "<p>plans</p>"
//! view = ["author"]
//!
//! [[pages.attachments]]
//! file_name = "chart.png"
//! content_type = "image/png"
//! data = "..."
//!
//! [[grants]]
//! host = "DOC:Host"
//! id = "plans"
//! granter = "author"
//! target = "SEC:Plans"
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use perimeter_capability::{Capability, CapabilityStore, PropertyCapabilityStore};
use perimeter_core::{
    ActorName, ContentId, ContentItem, ContentStatus, ContentStore, InMemoryHost, InclusionId,
    Permission, PerimeterConfig,
};

/// Grants to `"*"` apply to everyone, including anonymous requesters.
pub const EVERYONE: &str = "*";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteFixture {
    #[serde(default)]
    pub actors: Vec<ActorFixture>,

    #[serde(default)]
    pub pages: Vec<PageFixture>,

    #[serde(default)]
    pub grants: Vec<GrantFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorFixture {
    pub name: String,
    #[serde(default)]
    pub superuser: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageFixture {
    /// Fixed id; allocated when absent
    pub id: Option<u64>,
    pub space: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub view: Vec<String>,
    #[serde(default)]
    pub edit: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentFixture {
    pub file_name: String,
    pub content_type: String,
    #[serde(default)]
    pub data: String,
    pub thumbnail: Option<String>,
}

/// A capability stored before any command runs.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantFixture {
    pub host: String,
    pub id: String,
    pub granter: String,
    pub target: String,
}

/// A fixture loaded into a host.
pub struct Site {
    pub host: Arc<InMemoryHost>,
    pages: HashMap<(String, String), ContentId>,
}

impl SiteFixture {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read site fixture {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("invalid site fixture {}", path.display()))
    }

    pub fn parse(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Populate a fresh host. Grants are stored with `config`'s namespace.
    pub fn build(&self, config: &PerimeterConfig) -> Result<Site> {
        let host = Arc::new(InMemoryHost::new());

        for actor in &self.actors {
            let name = ActorName::new(actor.name.as_str())?;
            host.add_actor(name.clone());
            host.set_superuser(&name, actor.superuser);
        }

        let mut site = Site {
            host,
            pages: HashMap::new(),
        };
        for page in &self.pages {
            site.add_page(page)?;
        }

        let store = PropertyCapabilityStore::from_config(site.host.clone(), config);
        for grant in &self.grants {
            let host = site.page(&grant.host)?;
            let target = site.page(&grant.target)?;
            let capability = Capability::new(ActorName::new(grant.granter.as_str())?, target.id);
            store.save(host.id, &InclusionId::new(grant.id.as_str())?, &capability)?;
        }

        Ok(site)
    }
}

impl Site {
    fn add_page(&mut self, fixture: &PageFixture) -> Result<()> {
        let key = (fixture.space.clone(), fixture.title.clone());
        if self.pages.contains_key(&key) {
            bail!("duplicate page {}:{}", fixture.space, fixture.title);
        }

        let item = match fixture.id {
            Some(id) => {
                let id = ContentId::new(id);
                if let Some(existing) = self.host.get_by_id(id)? {
                    bail!(
                        "page {}:{} reuses id {} already held by {:?}",
                        fixture.space,
                        fixture.title,
                        id,
                        existing.title
                    );
                }
                let item = ContentItem::page(
                    id,
                    fixture.space.as_str(),
                    fixture.title.as_str(),
                    fixture.body.as_str(),
                );
                self.host.insert_content(item.clone());
                item
            }
            None => self.host.add_page(
                fixture.space.as_str(),
                fixture.title.as_str(),
                fixture.body.as_str(),
            ),
        };
        self.host.set_status(item.id, fixture.status);

        for (names, permission) in [
            (&fixture.view, Permission::View),
            (&fixture.edit, Permission::Edit),
        ] {
            for name in names {
                if name == EVERYONE {
                    self.host.grant(None, permission, item.id);
                } else {
                    self.host
                        .grant(Some(&ActorName::new(name.as_str())?), permission, item.id);
                }
            }
        }

        for attachment in &fixture.attachments {
            let stored = self.host.add_attachment(
                item.id,
                attachment.file_name.as_str(),
                attachment.content_type.as_str(),
                attachment.data.clone().into_bytes(),
            )?;
            if let Some(thumbnail) = &attachment.thumbnail {
                self.host
                    .set_thumbnail(&stored, thumbnail.clone().into_bytes());
            }
        }

        self.pages.insert(key, item.id);
        Ok(())
    }

    /// Look up a page by `SPACE:Title` or `$id`.
    pub fn page(&self, reference: &str) -> Result<ContentItem> {
        let id = match reference.strip_prefix('$') {
            Some(id) => id
                .parse::<ContentId>()
                .map_err(|e| anyhow!("invalid page reference {:?}: {}", reference, e))?,
            None => {
                let (space, title) = reference.split_once(':').ok_or_else(|| {
                    anyhow!("page reference must be SPACE:Title or $id: {:?}", reference)
                })?;
                *self
                    .pages
                    .get(&(space.to_string(), title.to_string()))
                    .ok_or_else(|| anyhow!("no page {:?} in the site fixture", reference))?
            }
        };

        self.host
            .get_by_id(id)?
            .ok_or_else(|| anyhow!("no content item {}", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perimeter_core::{AccessControl, Actor};

    const FIXTURE: &str = r#"
        [[actors]]
        name = "author"

        [[actors]]
        name = "admin"
        superuser = true

        [[pages]]
        id = 10
        space = "DOC"
        title = "Host"
        view = ["*"]
        edit = ["author"]

        [[pages]]
        space = "SEC"
        title = "Plans"
        body = "<p>plans</p>"
        view = ["author"]

        [[pages.attachments]]
        file_name = "chart.png"
        content_type = "image/png"
        data = "png"
        thumbnail = "thumb"

        [[grants]]
        host = "DOC:Host"
        id = "plans"
        granter = "author"
        target = "SEC:Plans"
    "#;

    #[test]
    fn test_build_site() {
        let config = PerimeterConfig::default();
        let site = SiteFixture::parse(FIXTURE).unwrap().build(&config).unwrap();

        let host = site.page("DOC:Host").unwrap();
        assert_eq!(host.id, ContentId::new(10));
        assert_eq!(site.page("$10").unwrap(), host);

        let author = Actor::new(ActorName::new("author").unwrap());
        let plans = site.page("SEC:Plans").unwrap();
        assert!(site.host.has_permission(Some(&author), Permission::View, &plans));
        assert!(!site.host.has_permission(None, Permission::View, &plans));
        assert!(site.host.has_permission(None, Permission::View, &host));

        let store = PropertyCapabilityStore::from_config(site.host.clone(), &config);
        let stored = store
            .load(host.id, &InclusionId::new("plans").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(stored.target(), plans.id);
    }

    #[test]
    fn test_bad_references() {
        let site = SiteFixture::parse(FIXTURE)
            .unwrap()
            .build(&PerimeterConfig::default())
            .unwrap();
        assert!(site.page("Plans").is_err());
        assert!(site.page("SEC:Missing").is_err());
        assert!(site.page("$x").is_err());
    }

    #[test]
    fn test_rejects_duplicate_fixed_ids() {
        let config = PerimeterConfig::default();
        let twice = r#"
            [[pages]]
            id = 7
            space = "DOC"
            title = "One"

            [[pages]]
            id = 7
            space = "DOC"
            title = "Two"
        "#;
        let err = SiteFixture::parse(twice).unwrap().build(&config).err().unwrap();
        assert!(err.to_string().contains("reuses id 7"));

        // The first allocated id is taken by the attachment of "Files".
        let allocated = r#"
            [[pages]]
            id = 5
            space = "DOC"
            title = "Files"

            [[pages.attachments]]
            file_name = "a.txt"
            content_type = "text/plain"

            [[pages]]
            id = 1000
            space = "DOC"
            title = "Late"
        "#;
        let err = SiteFixture::parse(allocated).unwrap().build(&config).err().unwrap();
        assert!(err.to_string().contains("reuses id 1000"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(SiteFixture::parse("[[actors]]\nname = \"a\"\nadmin = true\n").is_err());
    }
}
