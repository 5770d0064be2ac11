use std::sync::Arc;

use tracing::{debug, info};

use perimeter_core::traits::EventPublisher;
use perimeter_core::types::HostEvent;
use perimeter_core::utils::PerimeterConfig;

use super::{contains_root, DownloadStrategy};
use crate::access::{DelegatedAccess, GranterCheck};
use crate::error::DownloadError;
use crate::path::DownloadPath;
use crate::response::{DownloadRequest, DownloadResponse, FORCED_DOWNLOAD_CONTENT_TYPE};

/// Serves attachments of delegated content:
/// `{servlet}/{attachments}/{target}/{host}/{inclusion}/{file}[?version=N]`.
pub struct AttachmentDownload {
    access: Arc<DelegatedAccess>,
    events: Arc<dyn EventPublisher>,
    root: String,
    not_found_redirect: String,
}

impl AttachmentDownload {
    pub fn new(
        access: Arc<DelegatedAccess>,
        events: Arc<dyn EventPublisher>,
        config: &PerimeterConfig,
    ) -> Self {
        Self {
            access,
            events,
            root: config.delegated_attachments_path(),
            not_found_redirect: format!(
                "{}{}",
                config.web_app_context_path, config.attachment_not_found_path
            ),
        }
    }
}

impl DownloadStrategy for AttachmentDownload {
    fn name(&self) -> &'static str {
        "attachment"
    }

    fn matches(&self, path: &str) -> bool {
        contains_root(path, &self.root)
    }

    fn serve(&self, request: &DownloadRequest) -> Result<DownloadResponse, DownloadError> {
        let path = DownloadPath::parse(request.path(), request.query(), &self.root)?;
        let owner = self
            .access
            .authorize(&path, request.actor(), GranterCheck::Required)?;

        let Some(attachment) =
            self.access
                .content()
                .get_attachment(&owner, &path.file_name, path.version)?
        else {
            debug!(owner = %owner.id, file = %path.file_name, version = ?path.version, "no such attachment");
            return Ok(DownloadResponse::NotFound);
        };

        let Some(data) = self.access.content().attachment_data(&attachment)? else {
            debug!(attachment = %attachment.id, "attachment data unavailable");
            return Ok(DownloadResponse::Redirect(format!(
                "{}?pageId={}",
                self.not_found_redirect, owner.id
            )));
        };

        let content_type = if attachment.is_html() {
            FORCED_DOWNLOAD_CONTENT_TYPE.to_string()
        } else {
            attachment.content_type.clone()
        };

        self.events.publish(HostEvent::AttachmentViewed {
            attachment: attachment.id,
            owner: owner.id,
            viewer: request.actor().map(|actor| actor.name().clone()),
        });
        info!(
            attachment = %attachment.id,
            host = %path.host,
            inclusion = %path.inclusion,
            "serving delegated attachment"
        );
        Ok(DownloadResponse::stream(
            data,
            content_type,
            attachment.file_size,
        ))
    }
}
