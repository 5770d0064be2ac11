use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::ActorName;

/// Actions the host access-control service decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read the item
    View,

    /// Modify the item
    Edit,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::View => write!(f, "VIEW"),
            Permission::Edit => write!(f, "EDIT"),
        }
    }
}

/// An identity known to the host directory.
///
/// Anonymous requests are represented by the absence of an actor
/// (`Option<Actor>::None`), never by a placeholder name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    name: ActorName,
}

impl Actor {
    pub fn new(name: ActorName) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &ActorName {
        &self.name
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
