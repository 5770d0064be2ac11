use std::sync::Arc;

use tracing::{debug, info};

use perimeter_core::utils::PerimeterConfig;

use super::{contains_root, DownloadStrategy};
use crate::access::{DelegatedAccess, GranterCheck};
use crate::error::DownloadError;
use crate::path::DownloadPath;
use crate::response::{DownloadRequest, DownloadResponse};

/// Serves thumbnails of delegated image attachments:
/// `{servlet}/{thumbnails}/{target}/{host}/{inclusion}/{file}`.
///
/// The granter is re-validated unless `thumbnail_granter_check` is off, in
/// which case only the forgery and consistency checks apply.
pub struct ThumbnailDownload {
    access: Arc<DelegatedAccess>,
    root: String,
    granter_check: GranterCheck,
}

impl ThumbnailDownload {
    pub fn new(access: Arc<DelegatedAccess>, config: &PerimeterConfig) -> Self {
        Self {
            access,
            root: config.delegated_thumbnails_path(),
            granter_check: if config.thumbnail_granter_check {
                GranterCheck::Required
            } else {
                GranterCheck::Skipped
            },
        }
    }
}

impl DownloadStrategy for ThumbnailDownload {
    fn name(&self) -> &'static str {
        "thumbnail"
    }

    fn matches(&self, path: &str) -> bool {
        contains_root(path, &self.root)
    }

    fn serve(&self, request: &DownloadRequest) -> Result<DownloadResponse, DownloadError> {
        let path = DownloadPath::parse(request.path(), request.query(), &self.root)?;
        let owner = self
            .access
            .authorize(&path, request.actor(), self.granter_check)?;

        let content = self.access.content();
        let Some(attachment) = content.get_attachment(&owner, &path.file_name, path.version)?
        else {
            debug!(owner = %owner.id, file = %path.file_name, "no such attachment");
            return Ok(DownloadResponse::NotFound);
        };

        match content.thumbnail_data(&attachment)? {
            Some(data) => {
                info!(attachment = %attachment.id, host = %path.host, "serving delegated thumbnail");
                Ok(data.into())
            }
            None => {
                debug!(attachment = %attachment.id, "no thumbnail available");
                Ok(DownloadResponse::NotFound)
            }
        }
    }
}
