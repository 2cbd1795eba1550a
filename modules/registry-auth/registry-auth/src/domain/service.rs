//! Token service: authenticate, authorize, issue.

use std::sync::Arc;

use async_trait::async_trait;
use registry_auth_sdk::{
    AccessToken, AccessTokenIssuer, Authorizer, GrantType, OAuth2Request, OAuth2Response,
    PasswordAuthenticator, RefreshTokenAuthenticator, RefreshTokenIssuer, RegistryAuthError, Scope,
    Scopes, Subject, TokenRequest, TokenResponse, TokenService,
};
use secrecy::ExposeSecret;
use time::format_description::well_known::Rfc3339;

use super::authn::Authenticator;

/// Combines an access token and a refresh token issuer.
#[derive(Clone)]
pub struct TokenIssuer {
    pub access: Arc<dyn AccessTokenIssuer>,
    pub refresh: Arc<dyn RefreshTokenIssuer>,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(access: Arc<dyn AccessTokenIssuer>, refresh: Arc<dyn RefreshTokenIssuer>) -> Self {
        Self { access, refresh }
    }
}

#[async_trait]
impl AccessTokenIssuer for TokenIssuer {
    async fn issue_access_token(
        &self,
        service: &str,
        subject: Option<&dyn Subject>,
        scopes: &[Scope],
    ) -> Result<AccessToken, RegistryAuthError> {
        self.access.issue_access_token(service, subject, scopes).await
    }
}

#[async_trait]
impl RefreshTokenIssuer for TokenIssuer {
    async fn issue_refresh_token(
        &self,
        service: &str,
        subject: &dyn Subject,
    ) -> Result<String, RegistryAuthError> {
        self.refresh.issue_refresh_token(service, subject).await
    }
}

/// [`TokenService`] implementing the registry token and `OAuth2` flows.
pub struct TokenServiceImpl {
    authenticator: Authenticator,
    authorizer: Arc<dyn Authorizer>,
    token_issuer: TokenIssuer,
}

impl TokenServiceImpl {
    #[must_use]
    pub fn new(
        authenticator: Authenticator,
        authorizer: Arc<dyn Authorizer>,
        token_issuer: TokenIssuer,
    ) -> Self {
        Self {
            authenticator,
            authorizer,
            token_issuer,
        }
    }
}

#[async_trait]
impl TokenService for TokenServiceImpl {
    #[tracing::instrument(skip_all, fields(service = %request.service))]
    async fn handle_token(
        &self,
        request: &TokenRequest,
    ) -> Result<TokenResponse, RegistryAuthError> {
        request.validate()?;

        let subject = match &request.credentials {
            Some(credentials) => Some(
                self.authenticator
                    .authenticate_password(
                        &credentials.username,
                        credentials.password.expose_secret(),
                    )
                    .await?,
            ),
            None => None,
        };

        let granted = self
            .authorizer
            .authorize(subject.as_deref(), &request.scopes)
            .await?;

        let token = self
            .token_issuer
            .issue_access_token(&request.service, subject.as_deref(), &granted)
            .await?;

        let refresh_token = match subject.as_deref() {
            Some(subject) if request.offline => Some(
                self.token_issuer
                    .issue_refresh_token(&request.service, subject)
                    .await?,
            ),
            _ => None,
        };

        Ok(TokenResponse {
            token: token.payload,
            refresh_token,
            expires_in: Some(token.expires_in.as_secs()),
        })
    }

    #[tracing::instrument(skip_all, fields(service = %request.service))]
    async fn handle_oauth2(
        &self,
        request: &OAuth2Request,
    ) -> Result<OAuth2Response, RegistryAuthError> {
        request.validate()?;
        let grant_type = request.grant_type()?;

        let (subject, mut refresh_token) = match grant_type {
            GrantType::RefreshToken => {
                let presented = request.refresh_token.expose_secret();
                let subject = self
                    .authenticator
                    .authenticate_refresh_token(&request.service, presented)
                    .await?;
                (subject, Some(presented.to_owned()))
            }
            GrantType::Password => {
                let subject = self
                    .authenticator
                    .authenticate_password(&request.username, request.password.expose_secret())
                    .await?;
                (subject, None)
            }
        };

        let granted = self
            .authorizer
            .authorize(Some(subject.as_ref()), &request.scopes)
            .await?;

        let token = self
            .token_issuer
            .issue_access_token(&request.service, Some(subject.as_ref()), &granted)
            .await?;

        if request.is_offline() && grant_type == GrantType::RefreshToken {
            refresh_token = Some(
                self.token_issuer
                    .issue_refresh_token(&request.service, subject.as_ref())
                    .await?,
            );
        }

        let issued_at = token
            .issued_at
            .format(&Rfc3339)
            .map_err(|e| RegistryAuthError::Internal(format!("failed to format issued_at: {e}")))?;

        let scope = Scopes::from(granted).to_string();

        Ok(OAuth2Response {
            token: token.payload,
            scope: (!scope.is_empty()).then_some(scope),
            expires_in: Some(token.expires_in.as_secs()),
            issued_at: Some(issued_at),
            refresh_token,
        })
    }
}
