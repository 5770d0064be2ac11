use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use perimeter_core::id::{ActorName, ContentId};
use perimeter_core::traits::{AccessControl, ActorDirectory, ContentStore};
use perimeter_core::types::{Actor, ContentItem, Permission};

use super::audit::AuditLog;
use crate::model::{Capability, CapabilityError, InclusionKey};

/// Why a stored capability is no longer honoured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrantFailure {
    #[error("The content this secure include accesses no longer exists: {0}")]
    TargetGone(ContentId),

    #[error("The user who set up this secure include no longer exists: {0}")]
    GranterGone(ActorName),

    #[error("The user who set up this secure include no longer has access to the resource.")]
    GranterAccessRevoked { granter: ActorName, target: ContentId },
}

/// A capability that passed re-validation, with the live objects it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedGrant {
    pub granter: Actor,
    pub target: ContentItem,
}

/// Re-derives trust in a stored capability from current host state.
///
/// Nothing is cached: every call consults the content store, the actor
/// directory and access control afresh.
pub struct CapabilityChecker {
    content: Arc<dyn ContentStore>,
    access: Arc<dyn AccessControl>,
    actors: Arc<dyn ActorDirectory>,

    /// Optional audit log for recording re-validations
    audit_log: Option<Arc<AuditLog>>,
}

impl CapabilityChecker {
    pub fn new(
        content: Arc<dyn ContentStore>,
        access: Arc<dyn AccessControl>,
        actors: Arc<dyn ActorDirectory>,
    ) -> Self {
        Self {
            content,
            access,
            actors,
            audit_log: None,
        }
    }

    pub fn with_audit(mut self, audit_log: Arc<AuditLog>) -> Self {
        self.audit_log = Some(audit_log);
        self
    }

    pub fn set_audit_log(&mut self, audit_log: Option<Arc<AuditLog>>) {
        self.audit_log = audit_log;
    }

    pub fn audit_log(&self) -> Option<&Arc<AuditLog>> {
        self.audit_log.as_ref()
    }

    /// Check a capability before rendering its target.
    ///
    /// The target must still exist and not be trashed, the granter must
    /// still exist and must still be able to view the target.
    pub fn revalidate(
        &self,
        key: &InclusionKey,
        capability: &Capability,
    ) -> Result<ValidatedGrant, CapabilityError> {
        let target = match self.content.get_by_id(capability.target())? {
            Some(target) if !target.is_deleted() => target,
            _ => {
                let failure = GrantFailure::TargetGone(capability.target());
                self.record(key, capability, Some(&failure));
                return Err(failure.into());
            }
        };

        let granter = self.check_granter(key, capability, &target, false)?;
        Ok(ValidatedGrant { granter, target })
    }

    /// Check the granter of a capability against an already loaded target.
    ///
    /// With `allow_superuser`, a granter who is a superuser passes without a
    /// permission check.
    pub fn check_granter(
        &self,
        key: &InclusionKey,
        capability: &Capability,
        target: &ContentItem,
        allow_superuser: bool,
    ) -> Result<Actor, GrantFailure> {
        let result = self.granter_decision(capability, target, allow_superuser);
        self.record(key, capability, result.as_ref().err());
        result
    }

    fn granter_decision(
        &self,
        capability: &Capability,
        target: &ContentItem,
        allow_superuser: bool,
    ) -> Result<Actor, GrantFailure> {
        let granter = self
            .actors
            .get_actor_by_name(capability.granter())
            .ok_or_else(|| GrantFailure::GranterGone(capability.granter().clone()))?;

        if allow_superuser && self.access.is_superuser(&granter) {
            debug!(granter = %granter, "superuser granter passes without permission check");
            return Ok(granter);
        }

        if !self
            .access
            .has_permission(Some(&granter), Permission::View, target)
        {
            return Err(GrantFailure::GranterAccessRevoked {
                granter: granter.name().clone(),
                target: target.id,
            });
        }

        Ok(granter)
    }

    fn record(&self, key: &InclusionKey, capability: &Capability, failure: Option<&GrantFailure>) {
        if let Some(failure) = failure {
            warn!(inclusion = %key, capability = %capability, reason = %failure, "secure include capability rejected");
        }
        if let Some(audit_log) = &self.audit_log {
            audit_log.record(key, capability.granter(), failure.map(|f| f.to_string()));
        }
    }
}
