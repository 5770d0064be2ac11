use std::sync::Arc;

use tracing::{debug, warn};

use perimeter_core::id::{ContentId, InclusionId};
use perimeter_core::traits::PropertyStore;
use perimeter_core::utils::PerimeterConfig;

use super::CapabilityStore;
use crate::model::{Capability, CapabilityError};

/// Stores each capability as a JSON text property of its host item, under
/// `namespace + inclusion id`.
pub struct PropertyCapabilityStore {
    properties: Arc<dyn PropertyStore>,
    namespace: String,
}

impl PropertyCapabilityStore {
    pub fn new(properties: Arc<dyn PropertyStore>, namespace: impl Into<String>) -> Self {
        Self {
            properties,
            namespace: namespace.into(),
        }
    }

    pub fn with_default_namespace(properties: Arc<dyn PropertyStore>) -> Self {
        Self::new(properties, PerimeterConfig::default().property_namespace)
    }

    pub fn from_config(properties: Arc<dyn PropertyStore>, config: &PerimeterConfig) -> Self {
        Self::new(properties, config.property_namespace.clone())
    }

    /// The property key a given inclusion is stored under.
    pub fn key_for(&self, inclusion: &InclusionId) -> String {
        format!("{}{}", self.namespace, inclusion)
    }
}

impl CapabilityStore for PropertyCapabilityStore {
    fn save(
        &self,
        host: ContentId,
        inclusion: &InclusionId,
        capability: &Capability,
    ) -> Result<(), CapabilityError> {
        let json = capability.to_json()?;
        self.properties
            .set_text(host, &self.key_for(inclusion), &json)?;
        debug!(%host, %inclusion, %capability, "stored secure include capability");
        Ok(())
    }

    fn load(
        &self,
        host: ContentId,
        inclusion: &InclusionId,
    ) -> Result<Option<Capability>, CapabilityError> {
        let Some(json) = self.properties.get_text(host, &self.key_for(inclusion))? else {
            return Ok(None);
        };

        match Capability::from_json(&json) {
            Ok(capability) => Ok(Some(capability)),
            Err(e) => {
                warn!(%host, %inclusion, error = %e, "ignoring unreadable secure include capability");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perimeter_core::id::ActorName;
    use perimeter_core::InMemoryHost;

    fn setup() -> (Arc<InMemoryHost>, PropertyCapabilityStore, ContentId) {
        let host = Arc::new(InMemoryHost::new());
        let page = host.add_page("DOC", "Host", "");
        let store = PropertyCapabilityStore::with_default_namespace(host.clone());
        (host, store, page.id)
    }

    fn capability(granter: &str, target: u64) -> Capability {
        Capability::new(ActorName::new(granter).unwrap(), ContentId::new(target))
    }

    #[test]
    fn test_save_and_load() {
        let (host, store, page) = setup();
        let inclusion = InclusionId::new("x").unwrap();

        assert_eq!(store.load(page, &inclusion).unwrap(), None);

        store.save(page, &inclusion, &capability("alice", 5)).unwrap();
        assert_eq!(
            store.load(page, &inclusion).unwrap(),
            Some(capability("alice", 5))
        );
        assert_eq!(
            host.properties_of(page),
            vec![(
                "org.randombits.confluence.perimeter.SecureInclude:x".to_string(),
                r#"{"granterActor":"alice","targetContentId":5}"#.to_string()
            )]
        );
    }

    #[test]
    fn test_last_write_wins_and_resave_is_idempotent() {
        let (_host, store, page) = setup();
        let inclusion = InclusionId::new("x").unwrap();

        store.save(page, &inclusion, &capability("alice", 5)).unwrap();
        store.save(page, &inclusion, &capability("bob", 6)).unwrap();
        let before = store.load(page, &inclusion).unwrap();
        assert_eq!(before, Some(capability("bob", 6)));

        store.save(page, &inclusion, &capability("bob", 6)).unwrap();
        assert_eq!(store.load(page, &inclusion).unwrap(), before);
    }

    #[test]
    fn test_inclusions_are_independent() {
        let (_host, store, page) = setup();
        let first = InclusionId::new("first").unwrap();
        let second = InclusionId::new("second").unwrap();

        store.save(page, &first, &capability("alice", 5)).unwrap();
        assert_eq!(store.load(page, &second).unwrap(), None);
    }

    #[test]
    fn test_unreadable_record_is_absent() {
        let (host, store, page) = setup();
        let inclusion = InclusionId::new("x").unwrap();
        host.set_text(page, &store.key_for(&inclusion), "<secure-include-data/>")
            .unwrap();

        assert_eq!(store.load(page, &inclusion).unwrap(), None);
    }

    #[test]
    fn test_storage_failure_is_an_error() {
        let (_host, store, _page) = setup();
        let inclusion = InclusionId::new("x").unwrap();
        let missing = ContentId::new(1);

        assert!(matches!(
            store.save(missing, &inclusion, &capability("alice", 5)),
            Err(CapabilityError::Store(_))
        ));
    }

    #[test]
    fn test_custom_namespace() {
        let host = Arc::new(InMemoryHost::new());
        let store = PropertyCapabilityStore::new(host, "perimeter:");
        assert_eq!(store.key_for(&InclusionId::new("x").unwrap()), "perimeter:x");
    }
}
