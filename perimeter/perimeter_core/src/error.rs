//! Error types for Perimeter.
//!
//! `Error` is the root type returned by the host collaborator traits. The
//! higher crates define their own error enums and wrap this one.

use thiserror::Error;

/// Root error type for Perimeter.
#[derive(Debug, Error)]
pub enum Error {
    /// The content store failed to answer a lookup
    #[error("Content store error: {0}")]
    Content(String),

    /// The property store failed to read or write a property
    #[error("Property store error: {0}")]
    Property(String),

    /// The host rendering engine failed
    #[error("Render error: {0}")]
    Render(String),

    /// Identifier parsing or validation failed
    #[error("Identifier error: {0}")]
    Id(#[from] IdError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised while building identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// A textual identifier was empty or whitespace
    #[error("{0} must not be blank")]
    Blank(&'static str),

    /// A numeric content id could not be parsed
    #[error("invalid content id: {0:?}")]
    InvalidContentId(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type used throughout Perimeter.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::from(IdError::Blank("inclusion id"));
        assert_eq!(
            error.to_string(),
            "Identifier error: inclusion id must not be blank"
        );

        let error = Error::from(ConfigError::Invalid("servlet_path".to_string()));
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid configuration: servlet_path"
        );
    }
}
