use std::fmt;
use std::io::Read;

use perimeter_core::types::{Actor, FileData};

/// Content type forced on files a browser would otherwise render as a page.
pub const FORCED_DOWNLOAD_CONTENT_TYPE: &str = "application/x-download";

/// An inbound file request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    path: String,
    query: Option<String>,
    actor: Option<Actor>,
}

impl DownloadRequest {
    /// Build a request for `uri` (path plus optional `?query`) made by
    /// `actor`, `None` for anonymous.
    pub fn new(uri: &str, actor: Option<Actor>) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (uri, None),
        };
        Self {
            path: path.to_string(),
            query,
            actor,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The real requesting actor, never a granter.
    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }
}

/// The outcome of a file request.
pub enum DownloadResponse {
    /// Stream `body` with the given headers
    Stream {
        content_type: String,
        content_length: u64,
        body: Box<dyn Read + Send>,
    },
    NotFound,
    /// Send the requester to another location
    Redirect(String),
}

impl DownloadResponse {
    pub fn stream(data: FileData, content_type: impl Into<String>, content_length: u64) -> Self {
        DownloadResponse::Stream {
            content_type: content_type.into(),
            content_length,
            body: data.body,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DownloadResponse::NotFound)
    }
}

impl From<FileData> for DownloadResponse {
    fn from(data: FileData) -> Self {
        let content_type = data.content_type.clone();
        let length = data.length;
        DownloadResponse::stream(data, content_type, length)
    }
}

impl fmt::Debug for DownloadResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadResponse::Stream {
                content_type,
                content_length,
                ..
            } => f
                .debug_struct("Stream")
                .field("content_type", content_type)
                .field("content_length", content_length)
                .finish_non_exhaustive(),
            DownloadResponse::NotFound => write!(f, "NotFound"),
            DownloadResponse::Redirect(location) => f.debug_tuple("Redirect").field(location).finish(),
        }
    }
}
