use std::sync::Arc;

use tracing::debug;

use perimeter_core::traits::ResourceProvider;
use perimeter_core::utils::PerimeterConfig;

use super::{contains_root, DownloadStrategy};
use crate::error::DownloadError;
use crate::path::decode_segment;
use crate::response::{DownloadRequest, DownloadResponse};

/// Serves static plugin resources:
/// `{servlet}/{resources}/{pluginKey}/{path...}`. No delegation applies.
pub struct PluginResourceDownload {
    resources: Arc<dyn ResourceProvider>,
    root: String,
}

impl PluginResourceDownload {
    pub fn new(resources: Arc<dyn ResourceProvider>, config: &PerimeterConfig) -> Self {
        Self {
            resources,
            root: config.resources_path(),
        }
    }

    /// Split a request path into plugin key and resource path.
    fn locate(&self, path: &str) -> Option<(String, String)> {
        let start = path.find(&format!("{}/", self.root))?;
        let rest = &path[start + self.root.len() + 1..];
        let (plugin_key, resource) = rest.split_once('/')?;
        if plugin_key.is_empty() || resource.is_empty() {
            return None;
        }
        let resource = resource
            .split('/')
            .map(decode_segment)
            .collect::<Vec<_>>();
        // Resource paths never climb out of the plugin.
        if resource.iter().any(|segment| segment.is_empty() || segment == "." || segment == "..") {
            return None;
        }
        Some((decode_segment(plugin_key), resource.join("/")))
    }
}

impl DownloadStrategy for PluginResourceDownload {
    fn name(&self) -> &'static str {
        "resource"
    }

    fn matches(&self, path: &str) -> bool {
        contains_root(path, &self.root)
    }

    fn serve(&self, request: &DownloadRequest) -> Result<DownloadResponse, DownloadError> {
        let Some((plugin_key, resource)) = self.locate(request.path()) else {
            return Ok(DownloadResponse::NotFound);
        };

        match self.resources.resource(&plugin_key, &resource)? {
            Some(data) => Ok(data.into()),
            None => {
                debug!(plugin = %plugin_key, resource = %resource, "no such plugin resource");
                Ok(DownloadResponse::NotFound)
            }
        }
    }
}
