use std::sync::Arc;

use tracing::{debug, info, warn};

use perimeter_capability::{
    AuditLog, Capability, CapabilityChecker, CapabilityStore, InclusionKey, ValidatedGrant,
};
use perimeter_core::id::InclusionId;
use perimeter_core::render::{PageContext, RenderContext};
use perimeter_core::traits::{AccessControl, ActorDirectory, ContentStore, Renderer};
use perimeter_core::types::Permission;
use perimeter_core::utils::PerimeterConfig;
use perimeter_link::LinkResolver;

use crate::error::IncludeError;
use crate::form::input_form;
use crate::params::{MacroParameters, FORM_INCLUSION_ID_PARAM, FORM_LINK_PARAM};
use crate::rewrite::DelegatedUrls;

/// Where one inclusion stands for the current render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InclusionState {
    /// A capability exists, either stored earlier or granted by this request
    Established(Capability),
    /// No capability and the actor may edit the host: show the grant form
    Prompt { attempted_link: Option<String> },
    /// No capability and the actor may not edit the host: show nothing
    Empty,
}

/// Drives a secure include from grant to delegated render.
pub struct SecureInclude {
    access: Arc<dyn AccessControl>,
    renderer: Arc<dyn Renderer>,
    store: Arc<dyn CapabilityStore>,
    resolver: LinkResolver,
    checker: CapabilityChecker,
    config: PerimeterConfig,
}

impl SecureInclude {
    pub fn new(
        content: Arc<dyn ContentStore>,
        access: Arc<dyn AccessControl>,
        actors: Arc<dyn ActorDirectory>,
        store: Arc<dyn CapabilityStore>,
        renderer: Arc<dyn Renderer>,
        config: PerimeterConfig,
    ) -> Self {
        Self {
            resolver: LinkResolver::new(content.clone(), access.clone()),
            checker: CapabilityChecker::new(content, access.clone(), actors),
            access,
            renderer,
            store,
            config,
        }
    }

    pub fn with_audit(mut self, audit_log: Arc<AuditLog>) -> Self {
        self.checker.set_audit_log(Some(audit_log));
        self
    }

    pub fn config(&self) -> &PerimeterConfig {
        &self.config
    }

    /// Render one inclusion of the document `ctx` renders.
    ///
    /// The directive body is ignored. Returns the delegated rendering of the
    /// target, the grant form, or an empty string.
    pub fn execute(
        &self,
        params: &MacroParameters,
        _body: &str,
        ctx: &RenderContext,
    ) -> Result<String, IncludeError> {
        let inclusion = params.inclusion_id()?;

        match self.evaluate(&inclusion, ctx)? {
            InclusionState::Established(capability) => {
                let key = InclusionKey::new(ctx.content().id, inclusion);
                self.include(&key, &capability, ctx)
            }
            InclusionState::Prompt { attempted_link } => {
                Ok(input_form(&inclusion, ctx, attempted_link.as_deref()))
            }
            InclusionState::Empty => Ok(String::new()),
        }
    }

    /// Work out the state of `inclusion`, storing a capability if the request
    /// carries a valid grant for it.
    pub fn evaluate(
        &self,
        inclusion: &InclusionId,
        ctx: &RenderContext,
    ) -> Result<InclusionState, IncludeError> {
        let host = ctx.content();
        if let Some(capability) = self.store.load(host.id, inclusion)? {
            return Ok(InclusionState::Established(capability));
        }

        let submitted_link = ctx
            .request_param(FORM_INCLUSION_ID_PARAM)
            .filter(|id| *id == inclusion.as_str())
            .and_then(|_| ctx.request_param(FORM_LINK_PARAM));

        if let Some(link) = submitted_link {
            match self.grant(inclusion, link, ctx) {
                Ok(capability) => return Ok(InclusionState::Established(capability)),
                Err(IncludeError::LinkNotResolvable(link)) => {
                    info!(host = %host.id, %inclusion, link = %link, "secure include grant rejected");
                }
                Err(e) => return Err(e),
            }
        }

        let actor = ctx.current_actor();
        if self
            .access
            .has_permission(actor.as_ref(), Permission::Edit, host)
        {
            Ok(InclusionState::Prompt {
                attempted_link: submitted_link.map(str::to_string),
            })
        } else {
            Ok(InclusionState::Empty)
        }
    }

    fn grant(
        &self,
        inclusion: &InclusionId,
        link: &str,
        ctx: &RenderContext,
    ) -> Result<Capability, IncludeError> {
        let host = ctx.content();
        let not_resolvable = || IncludeError::LinkNotResolvable(link.to_string());

        let Some(granter) = ctx.current_actor() else {
            debug!(host = %host.id, %inclusion, "anonymous actors cannot grant");
            return Err(not_resolvable());
        };

        if self.config.grant_requires_edit
            && !self
                .access
                .has_permission(Some(&granter), Permission::Edit, host)
        {
            debug!(host = %host.id, %inclusion, granter = %granter, "granter cannot edit the host");
            return Err(not_resolvable());
        }

        let target = self
            .resolver
            .resolve(ctx.space_key(), link, Some(&granter))?
            .filter(|target| target.kind.has_body() && !target.is_deleted())
            .ok_or_else(not_resolvable)?;

        let capability = Capability::new(granter.name().clone(), target.id);
        self.store.save(host.id, inclusion, &capability)?;
        info!(host = %host.id, %inclusion, %capability, "secure include granted");
        Ok(capability)
    }

    fn include(
        &self,
        key: &InclusionKey,
        capability: &Capability,
        ctx: &RenderContext,
    ) -> Result<String, IncludeError> {
        let ValidatedGrant { granter, target } = self.checker.revalidate(key, capability)?;

        let urls = DelegatedUrls::new(&self.config, target.id, key);
        let outer = ctx.page();
        let page = PageContext {
            site_root: outer.site_root.clone(),
            base_url: outer.base_url.clone(),
            image_path: outer.image_path.clone(),
            attachments_path: format!(
                "{}{}",
                self.config.web_app_context_path,
                urls.attachments_path()
            ),
        };
        let nested = ctx.for_content(target, page);

        let rendered = ctx
            .actor_cell()
            .run_as(granter, || {
                self.renderer.render(&nested.content().body, &nested)
            })
            .map_err(|e| {
                warn!(inclusion = %key, error = %e, "delegated render failed");
                IncludeError::from(e)
            })?;

        debug!(inclusion = %key, content = %nested.content().id, "rendered secure include");
        Ok(urls.rewrite(&rendered))
    }
}
