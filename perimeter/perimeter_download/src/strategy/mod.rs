//! The download strategies a [`crate::FileServer`] dispatches to.

mod attachment;
mod resource;
mod thumbnail;

use crate::error::DownloadError;
use crate::response::{DownloadRequest, DownloadResponse};

pub use attachment::AttachmentDownload;
pub use resource::PluginResourceDownload;
pub use thumbnail::ThumbnailDownload;

/// One kind of file served under the delegated servlet.
pub trait DownloadStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Whether this strategy is responsible for `path`.
    fn matches(&self, path: &str) -> bool;

    /// Serve a request this strategy matched.
    ///
    /// Refusals are returned as [`DownloadError::Denied`] so the dispatcher
    /// can decide how to present them.
    fn serve(&self, request: &DownloadRequest) -> Result<DownloadResponse, DownloadError>;
}

/// Whether `path` contains `root` as a whole run of path components.
pub(crate) fn contains_root(path: &str, root: &str) -> bool {
    path.match_indices(root)
        .any(|(start, _)| path[start + root.len()..].starts_with('/'))
}
