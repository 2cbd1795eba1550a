//! Public API traits of the registry token service.
//!
//! Each capability is a separate trait so call sites can depend on the
//! narrowest one they need: a component that only authenticates by
//! password never sees the refresh token side, and vice versa.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RegistryAuthError;
use crate::models::{AccessToken, OAuth2Request, OAuth2Response, TokenRequest, TokenResponse};
use crate::scope::Scope;
use crate::subject::Subject;

/// Authenticates a subject with username and password.
#[async_trait]
pub trait PasswordAuthenticator: Send + Sync {
    /// Resolve the subject identified by `username` if `password` matches.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` for an unknown user, a disabled user or a
    ///   password mismatch; the three cases are indistinguishable
    /// - any other variant for backend failures
    async fn authenticate_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Arc<dyn Subject>, RegistryAuthError>;
}

/// Authenticates a subject with a previously issued refresh token.
#[async_trait]
pub trait RefreshTokenAuthenticator: Send + Sync {
    /// Verify `refresh_token` for `service` and resolve its subject.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` if the token is invalid or its subject is
    ///   no longer known
    /// - any other variant for backend failures
    async fn authenticate_refresh_token(
        &self,
        service: &str,
        refresh_token: &str,
    ) -> Result<Arc<dyn Subject>, RegistryAuthError>;
}

/// Decides which of the requested scopes a subject is granted.
///
/// `subject` is `None` for anonymous requests.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Return the granted subset of `scopes`, in request order.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for anonymous requests when anonymous access is disabled
    /// - any error returned by a policy delegate; no partial grant is returned
    async fn authorize(
        &self,
        subject: Option<&dyn Subject>,
        scopes: &[Scope],
    ) -> Result<Vec<Scope>, RegistryAuthError>;
}

/// Issues short-lived access tokens.
#[async_trait]
pub trait AccessTokenIssuer: Send + Sync {
    /// Issue an access token for `service` carrying the granted `scopes`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedKeyType` if the signing key cannot sign tokens
    /// - `Signing` if token serialization or signing fails
    async fn issue_access_token(
        &self,
        service: &str,
        subject: Option<&dyn Subject>,
        scopes: &[Scope],
    ) -> Result<AccessToken, RegistryAuthError>;
}

/// Issues long-lived refresh tokens.
#[async_trait]
pub trait RefreshTokenIssuer: Send + Sync {
    /// Issue a refresh token for `service` bound to `subject`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedKeyType` if the signing key cannot sign tokens
    /// - `Signing` if token serialization or signing fails
    async fn issue_refresh_token(
        &self,
        service: &str,
        subject: &dyn Subject,
    ) -> Result<String, RegistryAuthError>;
}

/// Token endpoint of the registry.
///
/// ```ignore
/// let response = service.handle_token(&request).await?;
/// println!("{}", response.token);
/// ```
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Handle a request of the registry token authentication flow.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the request is malformed
    /// - `AuthenticationFailed` or `Unauthorized` for rejected clients
    /// - any authorization or issuance error
    async fn handle_token(&self, request: &TokenRequest)
    -> Result<TokenResponse, RegistryAuthError>;

    /// Handle a request of the registry `OAuth2` flow.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the request is malformed
    /// - `AuthenticationFailed` or `Unauthorized` for rejected clients
    /// - any authorization or issuance error
    async fn handle_oauth2(
        &self,
        request: &OAuth2Request,
    ) -> Result<OAuth2Response, RegistryAuthError>;
}
