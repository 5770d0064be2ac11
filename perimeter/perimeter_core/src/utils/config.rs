//! Configuration for Perimeter.
//!
//! Every field has a default matching the host's standard URL layout, so an
//! empty TOML document is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::utils::logging::LogLevel;

/// Perimeter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerimeterConfig {
    /// Prefix of the content property holding a secure include's grant
    #[serde(default = "default_property_namespace")]
    pub property_namespace: String,

    /// Web application context path prepended to generated URLs
    #[serde(default)]
    pub web_app_context_path: String,

    /// Host path serving attachments directly
    #[serde(default = "default_native_attachments_path")]
    pub native_attachments_path: String,

    /// Host path serving thumbnails directly
    #[serde(default = "default_native_thumbnails_path")]
    pub native_thumbnails_path: String,

    /// Root of the delegated download servlet
    #[serde(default = "default_servlet_path")]
    pub servlet_path: String,

    #[serde(default = "default_attachments_prefix")]
    pub attachments_prefix: String,

    #[serde(default = "default_thumbnails_prefix")]
    pub thumbnails_prefix: String,

    #[serde(default = "default_resources_prefix")]
    pub resources_prefix: String,

    /// Whether thumbnail downloads re-verify the granter's access to the
    /// owning item, as attachment downloads do
    #[serde(default = "default_true")]
    pub thumbnail_granter_check: bool,

    /// Whether submitting a grant requires EDIT on the host document
    #[serde(default = "default_true")]
    pub grant_requires_edit: bool,

    /// Where anonymous requesters are sent when a download is refused
    #[serde(default = "default_not_permitted_path")]
    pub not_permitted_path: String,

    /// Where requesters are sent when attachment data cannot be opened
    #[serde(default = "default_attachment_not_found_path")]
    pub attachment_not_found_path: String,

    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_property_namespace() -> String {
    "org.randombits.confluence.perimeter.SecureInclude:".to_string()
}

fn default_native_attachments_path() -> String {
    "/download/attachments".to_string()
}

fn default_native_thumbnails_path() -> String {
    "/download/thumbnails".to_string()
}

fn default_servlet_path() -> String {
    "/plugins/servlet/perimeter".to_string()
}

fn default_attachments_prefix() -> String {
    "attachments".to_string()
}

fn default_thumbnails_prefix() -> String {
    "thumbnails".to_string()
}

fn default_resources_prefix() -> String {
    "resources".to_string()
}

fn default_true() -> bool {
    true
}

fn default_not_permitted_path() -> String {
    "/notpermitted.action".to_string()
}

fn default_attachment_not_found_path() -> String {
    "/attachmentnotfound.action".to_string()
}

impl Default for PerimeterConfig {
    fn default() -> Self {
        Self {
            property_namespace: default_property_namespace(),
            web_app_context_path: String::new(),
            native_attachments_path: default_native_attachments_path(),
            native_thumbnails_path: default_native_thumbnails_path(),
            servlet_path: default_servlet_path(),
            attachments_prefix: default_attachments_prefix(),
            thumbnails_prefix: default_thumbnails_prefix(),
            resources_prefix: default_resources_prefix(),
            thumbnail_granter_check: true,
            grant_requires_edit: true,
            not_permitted_path: default_not_permitted_path(),
            attachment_not_found_path: default_attachment_not_found_path(),
            log_level: LogLevel::default(),
        }
    }
}

impl PerimeterConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&source)?;
        info!("Loaded Perimeter configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.property_namespace.is_empty() {
            return Err(ConfigError::Invalid(
                "property_namespace must not be empty".to_string(),
            ));
        }

        for (name, path) in [
            ("native_attachments_path", &self.native_attachments_path),
            ("native_thumbnails_path", &self.native_thumbnails_path),
            ("servlet_path", &self.servlet_path),
        ] {
            if !path.starts_with('/') || path.ends_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "{} must start with '/' and not end with '/': {:?}",
                    name, path
                )));
            }
        }

        for (name, prefix) in [
            ("attachments_prefix", &self.attachments_prefix),
            ("thumbnails_prefix", &self.thumbnails_prefix),
            ("resources_prefix", &self.resources_prefix),
        ] {
            if prefix.is_empty() || prefix.contains('/') {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a single path component: {:?}",
                    name, prefix
                )));
            }
        }

        if self.web_app_context_path.ends_with('/') {
            return Err(ConfigError::Invalid(
                "web_app_context_path must not end with '/'".to_string(),
            ));
        }

        Ok(())
    }

    /// `{servlet_path}/{attachments_prefix}`
    pub fn delegated_attachments_path(&self) -> String {
        format!("{}/{}", self.servlet_path, self.attachments_prefix)
    }

    /// `{servlet_path}/{thumbnails_prefix}`
    pub fn delegated_thumbnails_path(&self) -> String {
        format!("{}/{}", self.servlet_path, self.thumbnails_prefix)
    }

    /// `{servlet_path}/{resources_prefix}`
    pub fn resources_path(&self) -> String {
        format!("{}/{}", self.servlet_path, self.resources_prefix)
    }
}
