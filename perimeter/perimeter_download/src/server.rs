use std::sync::Arc;

use tracing::{debug, warn};

use perimeter_capability::{AuditLog, CapabilityStore};
use perimeter_core::traits::{
    AccessControl, ActorDirectory, ContentStore, EventPublisher, ResourceProvider,
};
use perimeter_core::types::Actor;
use perimeter_core::utils::PerimeterConfig;

use crate::access::DelegatedAccess;
use crate::error::DownloadError;
use crate::response::{DownloadRequest, DownloadResponse};
use crate::strategy::{AttachmentDownload, DownloadStrategy, PluginResourceDownload, ThumbnailDownload};

/// The host collaborators a [`FileServer`] is wired to.
#[derive(Clone)]
pub struct FileServerServices {
    pub content: Arc<dyn ContentStore>,
    pub access: Arc<dyn AccessControl>,
    pub actors: Arc<dyn ActorDirectory>,
    pub capabilities: Arc<dyn CapabilityStore>,
    pub events: Arc<dyn EventPublisher>,
    pub resources: Arc<dyn ResourceProvider>,
    pub audit_log: Option<Arc<AuditLog>>,
}

/// Dispatches file requests under the delegated servlet to the first
/// matching strategy.
pub struct FileServer {
    strategies: Vec<Box<dyn DownloadStrategy>>,
    not_permitted: String,
}

impl FileServer {
    /// A server with an explicit, ordered strategy list.
    pub fn new(strategies: Vec<Box<dyn DownloadStrategy>>, config: &PerimeterConfig) -> Self {
        Self {
            strategies,
            not_permitted: format!("{}{}", config.web_app_context_path, config.not_permitted_path),
        }
    }

    /// The standard server: plugin resources, then thumbnails, then
    /// attachments.
    pub fn with_default_strategies(services: FileServerServices, config: &PerimeterConfig) -> Self {
        let mut access = DelegatedAccess::new(
            services.content,
            services.access,
            services.actors,
            services.capabilities,
        );
        if let Some(audit_log) = services.audit_log {
            access = access.with_audit(audit_log);
        }
        let access = Arc::new(access);

        let strategies: Vec<Box<dyn DownloadStrategy>> = vec![
            Box::new(PluginResourceDownload::new(services.resources, config)),
            Box::new(ThumbnailDownload::new(access.clone(), config)),
            Box::new(AttachmentDownload::new(access, services.events, config)),
        ];
        Self::new(strategies, config)
    }

    pub fn strategies(&self) -> impl Iterator<Item = &dyn DownloadStrategy> {
        self.strategies.iter().map(|strategy| strategy.as_ref())
    }

    /// Serve `request`.
    ///
    /// Refusals never reveal their reason: anonymous requesters are sent to
    /// the not-permitted prompt, everyone else gets not-found. Only host
    /// failures are returned as errors.
    pub fn serve(&self, request: &DownloadRequest) -> Result<DownloadResponse, DownloadError> {
        let Some(strategy) = self
            .strategies
            .iter()
            .find(|strategy| strategy.matches(request.path()))
        else {
            debug!(path = request.path(), "no download strategy matches");
            return Ok(DownloadResponse::NotFound);
        };

        match strategy.serve(request) {
            Err(DownloadError::Denied(denied)) => {
                warn!(
                    strategy = strategy.name(),
                    path = request.path(),
                    actor = ?request.actor().map(Actor::name),
                    reason = %denied.0,
                    "delegated download denied"
                );
                Ok(self.rejection(request.actor()))
            }
            other => other,
        }
    }

    fn rejection(&self, actor: Option<&Actor>) -> DownloadResponse {
        match actor {
            None => DownloadResponse::Redirect(self.not_permitted.clone()),
            Some(_) => DownloadResponse::NotFound,
        }
    }
}
