//! Configuration for the registry token service.

use std::path::PathBuf;
use std::time::Duration;

use registry_auth_sdk::RegistryAuthError;
use serde::{Deserialize, Serialize};

/// Configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryAuthConfig {
    /// Value of the `iss` claim of every issued token.
    pub issuer: String,

    /// PEM private key used to sign access and refresh tokens.
    pub signing_key: PathBuf,

    /// Optional PEM certificate chain for the signing key. When set, access
    /// tokens carry an `x5c` header instead of a `jwk`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_chain: Option<PathBuf>,

    /// Lifetime of access tokens, eg. `"15m"` or `"1h 30m"`.
    #[serde(with = "humantime_duration")]
    pub expiration: Duration,

    /// Grant tokens to clients that present no credentials.
    pub allow_anonymous: bool,

    /// Route of the token endpoint.
    pub path: String,
}

impl Default for RegistryAuthConfig {
    fn default() -> Self {
        Self {
            issuer: "registry-auth".to_owned(),
            signing_key: PathBuf::from("signing-key.pem"),
            certificate_chain: None,
            expiration: Duration::from_secs(15 * 60),
            allow_anonymous: false,
            path: "/token".to_owned(),
        }
    }
}

impl RegistryAuthConfig {
    /// Check values serde cannot reject on its own.
    ///
    /// # Errors
    ///
    /// Returns `RegistryAuthError::Config` for an empty issuer, a zero
    /// expiration or a path that does not start with `/`.
    pub fn validate(&self) -> Result<(), RegistryAuthError> {
        if self.issuer.is_empty() {
            return Err(RegistryAuthError::Config("issuer is required".to_owned()));
        }
        if self.expiration.is_zero() {
            return Err(RegistryAuthError::Config(
                "expiration must be greater than zero".to_owned(),
            ));
        }
        if !self.path.starts_with('/') {
            return Err(RegistryAuthError::Config(format!(
                "path \"{}\" must start with '/'",
                self.path
            )));
        }
        Ok(())
    }
}

mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
