//! The download command

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use perimeter_capability::PropertyCapabilityStore;
use perimeter_core::PerimeterConfig;
use perimeter_download::{DownloadRequest, DownloadResponse, FileServer, FileServerServices};

use super::acting_as;
use crate::site::SiteFixture;

/// Arguments for the download command
#[derive(Args)]
pub struct DownloadArgs {
    /// Site fixture (TOML)
    #[clap(long)]
    pub site: PathBuf,

    /// Request URI, path plus optional query
    #[clap(long)]
    pub uri: String,

    /// Request as this actor; anonymous when absent
    #[clap(long = "as")]
    pub actor: Option<String>,

    /// Write the file here instead of stdout
    #[clap(long)]
    pub output: Option<PathBuf>,
}

/// Print a status line, then the file body unless `--output` is given.
///
/// ```text
/// 200 image/png 6
/// 302 /notpermitted.action
/// 404 Not Found
/// ```
pub fn execute(args: &DownloadArgs, config: &PerimeterConfig) -> Result<ExitCode> {
    let site = SiteFixture::load(&args.site)?.build(config)?;
    let actor = acting_as(&site, args.actor.as_deref())?;

    let services = FileServerServices {
        content: site.host.clone(),
        access: site.host.clone(),
        actors: site.host.clone(),
        capabilities: Arc::new(PropertyCapabilityStore::from_config(site.host.clone(), config)),
        events: site.host.clone(),
        resources: site.host.clone(),
        audit_log: None,
    };
    let server = FileServer::with_default_strategies(services, config);

    match server.serve(&DownloadRequest::new(&args.uri, actor))? {
        DownloadResponse::Stream {
            content_type,
            content_length,
            mut body,
        } => {
            let mut bytes = Vec::new();
            body.read_to_end(&mut bytes)?;
            println!("200 {} {}", content_type, content_length);

            match &args.output {
                Some(path) => std::fs::write(path, &bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&bytes)?;
                    stdout.flush()?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        DownloadResponse::Redirect(location) => {
            println!("302 {}", location);
            Ok(ExitCode::SUCCESS)
        }
        DownloadResponse::NotFound => {
            println!("404 Not Found");
            Ok(ExitCode::from(1))
        }
    }
}
