//! Error types for the registry auth API.

use thiserror::Error;

/// Errors returned by every stage of the token pipeline.
///
/// Two variants carry protocol meaning and are surfaced to clients as
/// `401 Unauthorized`: [`RegistryAuthError::AuthenticationFailed`] and
/// [`RegistryAuthError::Unauthorized`]. Everything else is an internal or
/// request-shape failure.
#[derive(Debug, Error)]
pub enum RegistryAuthError {
    /// Credentials are invalid: unknown or disabled subject, password
    /// mismatch, or an invalid refresh token.
    ///
    /// Implementations must return this variant only when credential
    /// verification fails. Backend failures (eg. connection problems)
    /// should be reported as [`RegistryAuthError::Internal`].
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The client did not present any credentials and anonymous access is disabled.
    #[error("unauthorized")]
    Unauthorized,

    /// The request failed validation before any authentication happened.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A scope string does not follow the token scope grammar.
    #[error("invalid scope format: {0:?}")]
    InvalidScope(String),

    /// The signing key type has no matching JWT signing algorithm.
    #[error("unsupported signing key type {0:?}")]
    UnsupportedKeyType(String),

    /// Signing key material could not be loaded or converted.
    #[error("signing key error: {0}")]
    Key(String),

    /// Token signing failed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// A component was constructed with an invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An internal error occurred (backend failure, id generation, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl RegistryAuthError {
    /// Shorthand for [`RegistryAuthError::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns `true` for failures caused by the client's credentials
    /// ([`AuthenticationFailed`](Self::AuthenticationFailed) and
    /// [`Unauthorized`](Self::Unauthorized)).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::AuthenticationFailed | Self::Unauthorized)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_classified() {
        assert!(RegistryAuthError::AuthenticationFailed.is_client_error());
        assert!(RegistryAuthError::Unauthorized.is_client_error());
        assert!(!RegistryAuthError::invalid_request("service is required").is_client_error());
        assert!(!RegistryAuthError::Internal("boom".to_owned()).is_client_error());
    }

    #[test]
    fn invalid_scope_quotes_input() {
        let err = RegistryAuthError::InvalidScope("repository".to_owned());
        assert_eq!(err.to_string(), "invalid scope format: \"repository\"");
    }
}
