use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use perimeter_core::id::{ActorName, ContentId, InclusionId};

use crate::check::GrantFailure;

/// Errors that can occur during capability operations
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("Capability store error: {0}")]
    Store(#[from] perimeter_core::Error),

    #[error("Capability serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Grant(#[from] GrantFailure),
}

/// The persisted delegation record of one secure include.
///
/// A record only means something under the [`InclusionKey`] it was stored
/// under; the same record copied to another key is not trusted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    /// Identity whose access was proven when the include was set up
    pub granter_actor: ActorName,

    /// The item that was granted
    pub target_content_id: ContentId,
}

impl Capability {
    pub fn new(granter_actor: ActorName, target_content_id: ContentId) -> Self {
        Self {
            granter_actor,
            target_content_id,
        }
    }

    pub fn granter(&self) -> &ActorName {
        &self.granter_actor
    }

    pub fn target(&self) -> ContentId {
        self.target_content_id
    }

    pub fn to_json(&self) -> Result<String, CapabilityError> {
        serde_json::to_string(self).map_err(|e| CapabilityError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CapabilityError> {
        serde_json::from_str(json).map_err(|e| CapabilityError::Serialization(e.to_string()))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.granter_actor, self.target_content_id
        )
    }
}

/// The `(host document, inclusion id)` pair a capability belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InclusionKey {
    pub host: ContentId,
    pub inclusion: InclusionId,
}

impl InclusionKey {
    pub fn new(host: ContentId, inclusion: InclusionId) -> Self {
        Self { host, inclusion }
    }
}

impl fmt::Display for InclusionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host, self.inclusion)
    }
}
