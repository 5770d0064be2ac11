use thiserror::Error;

use perimeter_capability::{CapabilityError, GrantFailure};
use perimeter_core::id::{ActorName, ContentId};

/// Errors raised while executing a secure include.
///
/// Every variant except `LinkNotResolvable` is fatal to the render of the one
/// inclusion and is meant to be shown inline to the host document's readers.
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("Please supply an {0} which is unique to this page.")]
    MissingRequiredParameter(&'static str),

    /// A submitted link did not resolve to includable content. Turned into
    /// the prompt form with an inline message, never returned by `execute`.
    #[error("The specified link does not exist or is not accessible: {0}")]
    LinkNotResolvable(String),

    #[error("The content this secure include accesses no longer exists: {0}")]
    TargetGone(ContentId),

    #[error("The user who set up this secure include no longer exists: {0}")]
    GranterGone(ActorName),

    #[error("The user who set up this secure include no longer has access to the resource.")]
    GranterAccessRevoked { granter: ActorName, target: ContentId },

    /// The host rendering engine failed on the target body
    #[error("Failed to render the included content: {0}")]
    Render(String),

    /// A host collaborator failed
    #[error("Host error: {0}")]
    Host(String),
}

impl From<GrantFailure> for IncludeError {
    fn from(failure: GrantFailure) -> Self {
        match failure {
            GrantFailure::TargetGone(target) => IncludeError::TargetGone(target),
            GrantFailure::GranterGone(granter) => IncludeError::GranterGone(granter),
            GrantFailure::GranterAccessRevoked { granter, target } => {
                IncludeError::GranterAccessRevoked { granter, target }
            }
        }
    }
}

impl From<CapabilityError> for IncludeError {
    fn from(err: CapabilityError) -> Self {
        match err {
            CapabilityError::Grant(failure) => failure.into(),
            other => IncludeError::Host(other.to_string()),
        }
    }
}

impl From<perimeter_core::Error> for IncludeError {
    fn from(err: perimeter_core::Error) -> Self {
        match err {
            perimeter_core::Error::Render(message) => IncludeError::Render(message),
            other => IncludeError::Host(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_failures_keep_their_kind() {
        let granter = ActorName::new("alice").unwrap();
        let err: IncludeError = CapabilityError::Grant(GrantFailure::GranterAccessRevoked {
            granter: granter.clone(),
            target: ContentId::new(7),
        })
        .into();
        assert!(matches!(
            err,
            IncludeError::GranterAccessRevoked { ref granter, target }
                if granter.as_str() == "alice" && target == ContentId::new(7)
        ));

        let err: IncludeError = GrantFailure::TargetGone(ContentId::new(7)).into();
        assert_eq!(
            err.to_string(),
            "The content this secure include accesses no longer exists: 7"
        );
    }

    #[test]
    fn test_host_errors() {
        let err: IncludeError = perimeter_core::Error::Property("disk full".into()).into();
        assert!(matches!(err, IncludeError::Host(_)));

        let err: IncludeError = perimeter_core::Error::Render("bad macro".into()).into();
        assert!(matches!(err, IncludeError::Render(ref m) if m == "bad macro"));
    }

    #[test]
    fn test_missing_parameter_message() {
        assert_eq!(
            IncludeError::MissingRequiredParameter("id").to_string(),
            "Please supply an id which is unique to this page."
        );
    }
}
