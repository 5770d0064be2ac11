//! The context a document is rendered in.

use std::collections::HashMap;
use std::sync::Arc;

use crate::actor::CurrentActor;
use crate::types::{Actor, ContentItem};

/// URL roots the host uses while rendering a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub site_root: String,
    pub base_url: String,
    pub image_path: String,
    /// Root that attachment links of the rendered item are expected under
    pub attachments_path: String,
}

/// Parameters of the inbound HTTP request, such as a submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    params: HashMap<String, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// The parameter value, treating blank values as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

impl FromIterator<(String, String)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

/// Everything the host renderer, and Perimeter, know about one render call.
#[derive(Debug, Clone)]
pub struct RenderContext {
    content: ContentItem,
    page: PageContext,
    request: Option<RequestParams>,
    actor: Arc<CurrentActor>,
}

impl RenderContext {
    /// Context for rendering `content` on behalf of the request owning `actor`.
    pub fn new(content: ContentItem, actor: Arc<CurrentActor>) -> Self {
        Self {
            content,
            page: PageContext::default(),
            request: None,
            actor,
        }
    }

    pub fn with_page_context(mut self, page: PageContext) -> Self {
        self.page = page;
        self
    }

    pub fn with_request(mut self, request: RequestParams) -> Self {
        self.request = Some(request);
        self
    }

    /// A context for rendering a different item within this request.
    ///
    /// The acting identity cell is shared; request parameters are not carried
    /// over, so nested documents never see the outer document's form data.
    pub fn for_content(&self, content: ContentItem, page: PageContext) -> Self {
        Self {
            content,
            page,
            request: None,
            actor: Arc::clone(&self.actor),
        }
    }

    /// The item being rendered.
    pub fn content(&self) -> &ContentItem {
        &self.content
    }

    pub fn space_key(&self) -> &str {
        &self.content.space
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    /// A non-blank request parameter, if the render was triggered by a request.
    pub fn request_param(&self, name: &str) -> Option<&str> {
        self.request.as_ref().and_then(|request| request.get(name))
    }

    /// The identity the render is currently acting as.
    pub fn current_actor(&self) -> Option<Actor> {
        self.actor.get()
    }

    pub fn actor_cell(&self) -> &CurrentActor {
        &self.actor
    }
}
