use std::collections::HashMap;

use perimeter_core::id::InclusionId;

use crate::error::IncludeError;

/// Inclusion parameter naming the inclusion within its host document.
pub const INCLUSION_ID_PARAM: &str = "id";

/// Form field carrying the inclusion id a grant is submitted for.
pub const FORM_INCLUSION_ID_PARAM: &str = "secureIncludeId";

/// Form field carrying the link text a grant is submitted for.
pub const FORM_LINK_PARAM: &str = "secureIncludeLink";

pub const PAGE_ID_PARAM: &str = "pageId";

/// The pre-parsed key/value parameters of one inclusion directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroParameters {
    params: HashMap<String, String>,
}

impl MacroParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// A non-blank parameter value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// The required inclusion id.
    pub fn inclusion_id(&self) -> Result<InclusionId, IncludeError> {
        self.get(INCLUSION_ID_PARAM)
            .and_then(|id| InclusionId::new(id).ok())
            .ok_or(IncludeError::MissingRequiredParameter(INCLUSION_ID_PARAM))
    }
}

impl From<HashMap<String, String>> for MacroParameters {
    fn from(params: HashMap<String, String>) -> Self {
        Self { params }
    }
}

impl FromIterator<(String, String)> for MacroParameters {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}
