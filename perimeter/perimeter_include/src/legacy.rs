use std::collections::HashMap;
use std::sync::Arc;

use perimeter_core::render::RenderContext;

use crate::error::IncludeError;
use crate::orchestrator::SecureInclude;
use crate::params::MacroParameters;

/// Entry point for documents still using the old directive, which hands over
/// its parameters as an untyped map.
pub struct LegacySecureInclude {
    inner: Arc<SecureInclude>,
}

impl LegacySecureInclude {
    pub fn new(inner: Arc<SecureInclude>) -> Self {
        Self { inner }
    }

    pub fn execute(
        &self,
        params: &HashMap<String, String>,
        body: &str,
        ctx: &RenderContext,
    ) -> Result<String, IncludeError> {
        let params: MacroParameters = params
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        self.inner.execute(&params, body, ctx)
    }
}
