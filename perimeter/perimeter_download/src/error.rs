use thiserror::Error;

use perimeter_capability::{CapabilityError, GrantFailure};
use perimeter_core::id::ContentId;

use crate::path::PathError;

/// Why a delegated download was refused.
///
/// Reasons are logged and audited only; the requester sees a not-found
/// response or a login prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("malformed path: {0}")]
    MalformedPath(#[from] PathError),

    #[error("owning content {0} does not exist")]
    OwnerMissing(ContentId),

    #[error("owning content {0} is in the trash")]
    OwnerTrashed(ContentId),

    #[error("no capability stored for the inclusion")]
    NoCapability,

    #[error("requester cannot view host {0}")]
    HostNotViewable(ContentId),

    #[error("path target {path} does not match capability target {capability}")]
    TargetMismatch {
        path: ContentId,
        capability: ContentId,
    },

    #[error("granter check failed: {0}")]
    Granter(#[from] GrantFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("download denied: {0}")]
pub struct DownloadDenied(pub DenyReason);

/// Errors raised while serving a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Denied(#[from] DownloadDenied),

    /// A host collaborator failed
    #[error("Host error: {0}")]
    Host(#[from] perimeter_core::Error),

    #[error("Capability error: {0}")]
    Capability(CapabilityError),
}

impl DownloadError {
    pub fn denied(reason: impl Into<DenyReason>) -> Self {
        DownloadError::Denied(DownloadDenied(reason.into()))
    }

    /// The refusal reason, if this is a refusal.
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            DownloadError::Denied(DownloadDenied(reason)) => Some(reason),
            _ => None,
        }
    }
}

impl From<DenyReason> for DownloadError {
    fn from(reason: DenyReason) -> Self {
        DownloadError::denied(reason)
    }
}

impl From<PathError> for DownloadError {
    fn from(err: PathError) -> Self {
        DownloadError::denied(err)
    }
}

impl From<GrantFailure> for DownloadError {
    fn from(failure: GrantFailure) -> Self {
        DownloadError::denied(failure)
    }
}

impl From<CapabilityError> for DownloadError {
    fn from(err: CapabilityError) -> Self {
        match err {
            CapabilityError::Grant(failure) => failure.into(),
            CapabilityError::Store(e) => DownloadError::Host(e),
            other => DownloadError::Capability(other),
        }
    }
}
