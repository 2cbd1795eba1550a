//! JWT refresh token issuer and verifier.
//!
//! Refresh tokens carry no expiration claim; revocation is left to the
//! subject repository (a disabled or removed subject can no longer refresh).

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Header, Validation};
use registry_auth_sdk::{
    RefreshTokenIssuer, RefreshTokenVerifier, RegistryAuthError, Subject, SubjectId,
};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::key::SigningKey;

/// Tolerated clock skew, in seconds, for `nbf` and `exp`.
const LEEWAY: i64 = 60;

/// Claims of a refresh token.
///
/// Unknown claims are rejected, so access tokens signed with the same key
/// (which carry `jti` and `access`) never pass as refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshTokenClaims {
    pub iss: String,
    pub sub: String,
    pub aud: Vec<String>,
    /// Never set on issued tokens; honored when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    pub nbf: i64,
    pub iat: i64,
}

/// Issues and verifies signed refresh tokens with a single key.
pub struct JwtRefreshTokenIssuer {
    issuer: String,
    signing_key: Arc<SigningKey>,

    clock: Arc<dyn Clock>,
}

impl JwtRefreshTokenIssuer {
    #[must_use]
    pub fn new(issuer: impl Into<String>, signing_key: Arc<SigningKey>) -> Self {
        Self {
            issuer: issuer.into(),
            signing_key,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl RefreshTokenIssuer for JwtRefreshTokenIssuer {
    async fn issue_refresh_token(
        &self,
        service: &str,
        subject: &dyn Subject,
    ) -> Result<String, RegistryAuthError> {
        let header = Header::new(self.signing_key.algorithm()?);

        let now = self.clock.now().unix_timestamp();
        let claims = RefreshTokenClaims {
            iss: self.issuer.clone(),
            sub: subject.id().into_inner(),
            aud: vec![service.to_owned()],
            exp: None,
            nbf: now,
            iat: now,
        };

        jsonwebtoken::encode(&header, &claims, self.signing_key.encoding_key()?)
            .map_err(|e| RegistryAuthError::Signing(e.to_string()))
    }
}

#[async_trait]
impl RefreshTokenVerifier for JwtRefreshTokenIssuer {
    async fn verify_refresh_token(
        &self,
        service: &str,
        refresh_token: &str,
    ) -> Result<SubjectId, RegistryAuthError> {
        let mut validation = Validation::new(self.signing_key.algorithm()?);
        validation.set_audience(&[service]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["sub", "aud", "iss"]);
        // time claims are checked against the injected clock below
        validation.validate_nbf = false;
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<RefreshTokenClaims>(
            refresh_token,
            self.signing_key.decoding_key()?,
            &validation,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, service, "Refresh token rejected");
            RegistryAuthError::AuthenticationFailed
        })?;

        let now = self.clock.now().unix_timestamp();
        if data.claims.nbf > now + LEEWAY {
            tracing::debug!(service, nbf = data.claims.nbf, "Refresh token not yet valid");
            return Err(RegistryAuthError::AuthenticationFailed);
        }
        if let Some(exp) = data.claims.exp
            && exp < now - LEEWAY
        {
            tracing::debug!(service, exp, "Refresh token expired");
            return Err(RegistryAuthError::AuthenticationFailed);
        }

        if data.claims.sub.is_empty() {
            tracing::debug!(service, "Refresh token has an empty subject");
            return Err(RegistryAuthError::AuthenticationFailed);
        }

        Ok(SubjectId::from(data.claims.sub))
    }
}
