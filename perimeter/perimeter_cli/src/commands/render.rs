//! The render command

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use perimeter_capability::PropertyCapabilityStore;
use perimeter_core::{
    CurrentActor, PageContext, PerimeterConfig, PlainRenderer, RenderContext, RequestParams,
};
use perimeter_include::params::{FORM_INCLUSION_ID_PARAM, FORM_LINK_PARAM, INCLUSION_ID_PARAM};
use perimeter_include::{MacroParameters, SecureInclude};

use super::acting_as;
use crate::site::SiteFixture;

/// Arguments for the render command
#[derive(Args)]
pub struct RenderArgs {
    /// Site fixture (TOML)
    #[clap(long)]
    pub site: PathBuf,

    /// Host page, as `SPACE:Title` or `$id`
    #[clap(long)]
    pub page: String,

    /// Inclusion id of the secure include on the host page
    #[clap(long)]
    pub id: String,

    /// Render as this actor; anonymous when absent
    #[clap(long = "as")]
    pub actor: Option<String>,

    /// Submit the grant form with this link before rendering
    #[clap(long)]
    pub link: Option<String>,
}

/// Print the HTML the include produces. Include errors are printed the way
/// the host shows them, with a failing exit code.
pub fn execute(args: &RenderArgs, config: &PerimeterConfig) -> Result<ExitCode> {
    let site = SiteFixture::load(&args.site)?.build(config)?;
    let actor = acting_as(&site, args.actor.as_deref())?;
    let page = site.page(&args.page)?;

    let include = SecureInclude::new(
        site.host.clone(),
        site.host.clone(),
        site.host.clone(),
        Arc::new(PropertyCapabilityStore::from_config(site.host.clone(), config)),
        Arc::new(PlainRenderer),
        config.clone(),
    );

    let context_path = &config.web_app_context_path;
    let mut ctx = RenderContext::new(page, Arc::new(CurrentActor::new(actor)))
        .with_page_context(PageContext {
            site_root: context_path.clone(),
            base_url: context_path.clone(),
            image_path: format!("{}/images", context_path),
            attachments_path: format!("{}{}", context_path, config.native_attachments_path),
        });
    if let Some(link) = &args.link {
        ctx = ctx.with_request(
            RequestParams::new()
                .with(FORM_INCLUSION_ID_PARAM, args.id.as_str())
                .with(FORM_LINK_PARAM, link.as_str()),
        );
    }

    let params = MacroParameters::new().with(INCLUSION_ID_PARAM, args.id.as_str());
    match include.execute(&params, "", &ctx) {
        Ok(html) => {
            println!("{}", html);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", e);
            Ok(ExitCode::from(1))
        }
    }
}
