//! Request logging for any [`TokenService`].

use async_trait::async_trait;
use registry_auth_sdk::{
    OAuth2Request, OAuth2Response, RegistryAuthError, TokenRequest, TokenResponse, TokenService,
};

/// Logs the outcome of every token request and passes the result through unchanged.
///
/// Client errors (rejected credentials, anonymous access denied) are logged
/// at `info`, every other error at `error`.
pub struct LoggingTokenService<S> {
    inner: S,
}

impl<S> LoggingTokenService<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

fn log_outcome<T>(result: &Result<T, RegistryAuthError>) {
    match result {
        Ok(_) => tracing::info!("client authorized"),
        Err(e) if e.is_client_error() => {
            tracing::info!(error = %e, "authorization failed due to client error");
        }
        Err(e) => tracing::error!(error = %e, "authorization failed"),
    }
}

#[async_trait]
impl<S: TokenService> TokenService for LoggingTokenService<S> {
    async fn handle_token(
        &self,
        request: &TokenRequest,
    ) -> Result<TokenResponse, RegistryAuthError> {
        let result = self.inner.handle_token(request).await;

        let span = tracing::info_span!(
            "token_request",
            client_id = %request.client_id,
            service = %request.service,
            scopes = %request.scopes,
            offline = request.offline,
            anonymous = request.is_anonymous(),
        );
        span.in_scope(|| log_outcome(&result));

        result
    }

    async fn handle_oauth2(
        &self,
        request: &OAuth2Request,
    ) -> Result<OAuth2Response, RegistryAuthError> {
        let result = self.inner.handle_oauth2(request).await;

        let span = tracing::info_span!(
            "oauth2_request",
            client_id = %request.client_id,
            service = %request.service,
            scopes = %request.scopes,
            offline = request.is_offline(),
            grant_type = %request.grant_type,
        );
        span.in_scope(|| log_outcome(&result));

        result
    }
}
