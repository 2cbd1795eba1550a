//! Wires the token service from configuration.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use registry_auth::domain::{
    Authenticator, DefaultAuthorizer, DefaultRefreshTokenAuthenticator,
    DefaultRepositoryAuthorizer, LoggingTokenService, TokenIssuer, TokenServiceImpl,
    TracingErrorHandler,
};
use registry_auth::token::{JwtAccessTokenIssuer, JwtRefreshTokenIssuer, SigningKey};
use registry_auth::{RegistryAuthConfig, api};
use static_users_plugin::UserAuthenticator;

use crate::config::AppConfig;

/// Build the HTTP router for `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the signing key,
/// certificate chain or user list cannot be loaded.
pub fn build_router(config: &AppConfig) -> anyhow::Result<Router> {
    let auth = &config.auth;
    auth.validate()?;

    let signing_key = Arc::new(load_signing_key(auth)?);
    tracing::info!(
        key_type = signing_key.key_type(),
        key_id = signing_key.key_id().unwrap_or_default(),
        "loaded signing key"
    );

    let users = Arc::new(
        UserAuthenticator::from_config(&config.users).context("failed to load users")?,
    );

    let access = JwtAccessTokenIssuer::new(
        auth.issuer.as_str(),
        Arc::clone(&signing_key),
        auth.expiration,
    )?;
    let refresh = Arc::new(JwtRefreshTokenIssuer::new(
        auth.issuer.as_str(),
        signing_key,
    ));

    let authenticator = Authenticator::new(
        Arc::clone(&users) as _,
        Arc::new(DefaultRefreshTokenAuthenticator::new(
            Arc::clone(&refresh) as _,
            users,
        )),
    );
    let authorizer = DefaultAuthorizer::new(
        Arc::new(DefaultRepositoryAuthorizer::new(auth.allow_anonymous)),
        auth.allow_anonymous,
    );

    let service = TokenServiceImpl::new(
        authenticator,
        Arc::new(authorizer),
        TokenIssuer::new(Arc::new(access), refresh),
    );

    Ok(api::rest::router(
        &auth.path,
        Arc::new(LoggingTokenService::new(service)),
        Arc::new(TracingErrorHandler),
    ))
}

fn load_signing_key(auth: &RegistryAuthConfig) -> anyhow::Result<SigningKey> {
    let key = SigningKey::from_pem_file(&auth.signing_key).with_context(|| {
        format!(
            "failed to load signing key {}",
            auth.signing_key.display()
        )
    })?;

    let Some(chain) = &auth.certificate_chain else {
        return Ok(key);
    };

    let pem = std::fs::read(chain)
        .with_context(|| format!("failed to read certificate chain {}", chain.display()))?;
    Ok(key.with_cert_chain_pem(&pem)?)
}
