//! JWT access token issuer.
//!
//! Tokens follow the registry token authentication JWT format: registered
//! claims plus an `access` claim listing the granted scopes, with the
//! signing key's certificate chain or public JWK embedded in the header.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use registry_auth_sdk::{AccessToken, AccessTokenIssuer, RegistryAuthError, Scope, Subject};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::id::{IdGenerator, UuidGenerator};
use super::key::SigningKey;

/// Claims of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    /// Absent for anonymous tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub aud: Vec<String>,
    pub exp: i64,
    pub nbf: i64,
    pub iat: i64,
    pub jti: String,
    pub access: Vec<Scope>,
}

/// Issues signed access tokens.
pub struct JwtAccessTokenIssuer {
    issuer: String,
    signing_key: Arc<SigningKey>,
    expiration: Duration,

    id_generator: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl JwtAccessTokenIssuer {
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::Config`] if `expiration` is zero.
    pub fn new(
        issuer: impl Into<String>,
        signing_key: Arc<SigningKey>,
        expiration: Duration,
    ) -> Result<Self, RegistryAuthError> {
        if expiration.is_zero() {
            return Err(RegistryAuthError::Config(
                "access token expiration must be positive".to_owned(),
            ));
        }

        Ok(Self {
            issuer: issuer.into(),
            signing_key,
            expiration,
            id_generator: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    #[must_use]
    pub fn expiration(&self) -> Duration {
        self.expiration
    }
}

#[async_trait]
impl AccessTokenIssuer for JwtAccessTokenIssuer {
    async fn issue_access_token(
        &self,
        service: &str,
        subject: Option<&dyn Subject>,
        scopes: &[Scope],
    ) -> Result<AccessToken, RegistryAuthError> {
        let header = self.signing_key.access_token_header()?;
        let jti = self.id_generator.generate_id()?;

        let now = self.clock.now();
        let lifetime = time::Duration::try_from(self.expiration)
            .map_err(|e| RegistryAuthError::Internal(format!("invalid expiration: {e}")))?;
        let expires_at = now
            .checked_add(lifetime)
            .ok_or_else(|| RegistryAuthError::Internal("expiration out of range".to_owned()))?;

        let claims = AccessTokenClaims {
            iss: self.issuer.clone(),
            sub: subject.map(|s| s.id().into_inner()),
            aud: vec![service.to_owned()],
            exp: expires_at.unix_timestamp(),
            nbf: now.unix_timestamp(),
            iat: now.unix_timestamp(),
            jti,
            access: scopes.to_vec(),
        };

        let payload = jsonwebtoken::encode(&header, &claims, self.signing_key.encoding_key()?)
            .map_err(|e| RegistryAuthError::Signing(e.to_string()))?;

        Ok(AccessToken {
            payload,
            expires_in: self.expiration,
            issued_at: now,
        })
    }
}
