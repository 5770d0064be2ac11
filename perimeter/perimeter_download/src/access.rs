use std::sync::Arc;

use tracing::debug;

use perimeter_capability::{AuditLog, CapabilityChecker, CapabilityStore, InclusionKey};
use perimeter_core::traits::{AccessControl, ActorDirectory, ContentStore};
use perimeter_core::types::{Actor, ContentItem, Permission};

use crate::error::{DenyReason, DownloadError};
use crate::path::DownloadPath;

/// Whether the granter of the capability is re-validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GranterCheck {
    /// The granter must still exist and view the owning item, or be a superuser
    Required,
    Skipped,
}

/// The checks shared by every delegated file download.
pub struct DelegatedAccess {
    content: Arc<dyn ContentStore>,
    access: Arc<dyn AccessControl>,
    store: Arc<dyn CapabilityStore>,
    checker: CapabilityChecker,
}

impl DelegatedAccess {
    pub fn new(
        content: Arc<dyn ContentStore>,
        access: Arc<dyn AccessControl>,
        actors: Arc<dyn ActorDirectory>,
        store: Arc<dyn CapabilityStore>,
    ) -> Self {
        Self {
            checker: CapabilityChecker::new(content.clone(), access.clone(), actors),
            content,
            access,
            store,
        }
    }

    pub fn with_audit(mut self, audit_log: Arc<AuditLog>) -> Self {
        self.checker.set_audit_log(Some(audit_log));
        self
    }

    pub fn content(&self) -> &Arc<dyn ContentStore> {
        &self.content
    }

    /// Authorize `actor` to fetch a file of the item named by `path`,
    /// returning that owning item.
    pub fn authorize(
        &self,
        path: &DownloadPath,
        actor: Option<&Actor>,
        granter_check: GranterCheck,
    ) -> Result<ContentItem, DownloadError> {
        let owner = match self.content.get_by_id(path.target)? {
            Some(owner) if owner.is_deleted() => {
                return Err(DenyReason::OwnerTrashed(path.target).into())
            }
            Some(owner) => owner,
            None => return Err(DenyReason::OwnerMissing(path.target).into()),
        };

        let capability = self
            .store
            .load(path.host, &path.inclusion)?
            .ok_or(DenyReason::NoCapability)?;

        // The requester must be able to see the page that embeds the include.
        let host_viewable = self
            .content
            .get_by_id(path.host)?
            .is_some_and(|host| self.access.has_permission(actor, Permission::View, &host));
        if !host_viewable {
            return Err(DenyReason::HostNotViewable(path.host).into());
        }

        if capability.target() != path.target {
            return Err(DenyReason::TargetMismatch {
                path: path.target,
                capability: capability.target(),
            }
            .into());
        }

        if granter_check == GranterCheck::Required {
            let key = InclusionKey::new(path.host, path.inclusion.clone());
            self.checker.check_granter(&key, &capability, &owner, true)?;
        }

        debug!(owner = %path.target, host = %path.host, inclusion = %path.inclusion, "delegated download authorized");
        Ok(owner)
    }
}
