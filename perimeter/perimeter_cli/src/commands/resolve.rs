//! The resolve command

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use perimeter_core::PerimeterConfig;
use perimeter_link::LinkResolver;

use super::acting_as;
use crate::site::SiteFixture;

/// Arguments for the resolve command
#[derive(Args)]
pub struct ResolveArgs {
    /// Site fixture (TOML)
    #[clap(long)]
    pub site: PathBuf,

    /// Space the link is relative to
    #[clap(long)]
    pub space: String,

    /// The link, e.g. `SPACE:Title#anchor` or `$1234`
    #[clap(long)]
    pub link: String,

    /// Resolve as this actor; anonymous when absent
    #[clap(long = "as")]
    pub actor: Option<String>,
}

/// Print `{id} {space}:{title}` for the resolved item, or `unresolved`.
pub fn execute(args: &ResolveArgs, config: &PerimeterConfig) -> Result<ExitCode> {
    let site = SiteFixture::load(&args.site)?.build(config)?;
    let actor = acting_as(&site, args.actor.as_deref())?;

    let resolver = LinkResolver::new(site.host.clone(), site.host.clone());
    match resolver.resolve(&args.space, &args.link, actor.as_ref())? {
        Some(item) => {
            println!("{} {}:{}", item.id, item.space, item.title);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("unresolved");
            Ok(ExitCode::from(1))
        }
    }
}
