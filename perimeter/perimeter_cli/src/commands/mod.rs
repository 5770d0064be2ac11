//! Command implementations
//!
//! Each command loads a site fixture, runs one Perimeter operation against it
//! and prints the outcome to stdout.

pub mod download;
pub mod render;
pub mod resolve;

use anyhow::{anyhow, Result};

use perimeter_core::{Actor, ActorDirectory, ActorName};

use crate::site::Site;

/// Look up the acting user; `None` acts anonymously.
pub fn acting_as(site: &Site, name: Option<&str>) -> Result<Option<Actor>> {
    let Some(name) = name else {
        return Ok(None);
    };
    let name = ActorName::new(name)?;
    site.host
        .get_actor_by_name(&name)
        .map(Some)
        .ok_or_else(|| anyhow!("no actor {:?} in the site fixture", name.as_str()))
}
