//! # Perimeter Download
//!
//! Files of delegated content are linked through
//! `{servlet}/{prefix}/{target}/{host}/{inclusion}/{file}` instead of the
//! host's native download paths. Every request re-checks, in order:
//!
//! 1. the path parses and the owning item `target` exists and is not trashed
//! 2. a capability is stored for `(host, inclusion)`
//! 3. the real requester can view `host` (forged URLs)
//! 4. the capability grants `target` and no other item
//! 5. the granter still exists and can view `target`, or is a superuser
//!
//! The [`FileServer`] tries its strategies in order and the first match
//! serves the request.

mod access;
pub mod error;
pub mod path;
mod response;
mod server;
pub mod strategy;

pub use access::{DelegatedAccess, GranterCheck};
pub use error::{DenyReason, DownloadDenied, DownloadError};
pub use path::{DownloadPath, PathError};
pub use response::{DownloadRequest, DownloadResponse, FORCED_DOWNLOAD_CONTENT_TYPE};
pub use server::{FileServer, FileServerServices};
pub use strategy::{AttachmentDownload, DownloadStrategy, PluginResourceDownload, ThumbnailDownload};
