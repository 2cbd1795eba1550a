//! Request and response models of the registry token endpoints.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::RegistryAuthError;
use crate::scope::Scopes;

/// A signed access token, returned once and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Serialized, signed token.
    pub payload: String,
    /// Lifetime of the token.
    pub expires_in: Duration,
    /// Issuance instant; the same instant used for the token's `iat` claim.
    pub issued_at: OffsetDateTime,
}

/// Basic credentials presented to the token endpoint.
pub struct PasswordCredentials {
    pub username: String,
    pub password: SecretString,
}

impl PasswordCredentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Token request of the registry token authentication flow.
///
/// `credentials` is `None` for anonymous requests.
#[derive(Debug, Default)]
pub struct TokenRequest {
    pub service: String,
    pub client_id: String,
    pub offline: bool,
    pub scopes: Scopes,
    pub credentials: Option<PasswordCredentials>,
}

impl TokenRequest {
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.credentials.is_none()
    }

    /// Validate the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::InvalidRequest`] when `service` is empty.
    pub fn validate(&self) -> Result<(), RegistryAuthError> {
        if self.service.is_empty() {
            return Err(RegistryAuthError::invalid_request("service is required"));
        }

        Ok(())
    }
}

/// Token response of the registry token authentication flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "access_token")]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// `OAuth2` grant types supported by the registry `OAuth2` flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    Password,
    RefreshToken,
}

impl GrantType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl FromStr for GrantType {
    type Err = RegistryAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(Self::Password),
            "refresh_token" => Ok(Self::RefreshToken),
            "" => Err(RegistryAuthError::invalid_request("missing grant_type value")),
            _ => Err(RegistryAuthError::invalid_request("unknown grant_type value")),
        }
    }
}

/// `OAuth2` access type hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Online,
    Offline,
}

impl FromStr for AccessType {
    type Err = RegistryAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            _ => Err(RegistryAuthError::invalid_request("unknown access_type value")),
        }
    }
}

/// Token request of the registry `OAuth2` flow.
///
/// `grant_type` and `access_type` hold the raw form values;
/// [`OAuth2Request::validate`] checks them.
pub struct OAuth2Request {
    pub grant_type: String,

    pub service: String,
    pub client_id: String,
    pub access_type: String,
    pub scopes: Scopes,

    pub username: String,
    pub password: SecretString,
    pub refresh_token: SecretString,
}

impl Default for OAuth2Request {
    fn default() -> Self {
        Self {
            grant_type: String::new(),
            service: String::new(),
            client_id: String::new(),
            access_type: String::new(),
            scopes: Scopes::default(),
            username: String::new(),
            password: SecretString::from(String::new()),
            refresh_token: SecretString::from(String::new()),
        }
    }
}

impl fmt::Debug for OAuth2Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Request")
            .field("grant_type", &self.grant_type)
            .field("service", &self.service)
            .field("client_id", &self.client_id)
            .field("access_type", &self.access_type)
            .field("scopes", &self.scopes)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl OAuth2Request {
    /// Parsed grant type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::InvalidRequest`] for a missing or unknown grant type.
    pub fn grant_type(&self) -> Result<GrantType, RegistryAuthError> {
        self.grant_type.parse()
    }

    /// Parsed access type; `None` when the client did not send one.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::InvalidRequest`] for an unknown access type.
    pub fn access_type(&self) -> Result<Option<AccessType>, RegistryAuthError> {
        if self.access_type.is_empty() {
            return Ok(None);
        }
        self.access_type.parse().map(Some)
    }

    /// Whether the client asked for offline access.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        matches!(self.access_type(), Ok(Some(AccessType::Offline)))
    }

    /// Validate the request shape.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::InvalidRequest`] when `service`,
    /// `client_id` or `grant_type` is missing, the grant type is unknown,
    /// the credentials required by the grant type are missing, or the
    /// access type is not one of `""`, `online`, `offline`.
    pub fn validate(&self) -> Result<(), RegistryAuthError> {
        if self.service.is_empty() {
            return Err(RegistryAuthError::invalid_request("service is required"));
        }

        if self.client_id.is_empty() {
            return Err(RegistryAuthError::invalid_request("client ID is required"));
        }

        match self.grant_type()? {
            GrantType::RefreshToken => {
                if self.refresh_token.expose_secret().is_empty() {
                    return Err(RegistryAuthError::invalid_request(
                        "missing refresh_token value",
                    ));
                }
            }
            GrantType::Password => {
                if self.username.is_empty() {
                    return Err(RegistryAuthError::invalid_request("missing username value"));
                }

                if self.password.expose_secret().is_empty() {
                    return Err(RegistryAuthError::invalid_request("missing password value"));
                }
            }
        }

        self.access_type()?;

        Ok(())
    }
}

/// Token response of the registry `OAuth2` flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Response {
    #[serde(rename = "access_token")]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// RFC 3339 issuance instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn password_request() -> OAuth2Request {
        OAuth2Request {
            grant_type: "password".to_owned(),
            service: "registry.example.com".to_owned(),
            client_id: "docker".to_owned(),
            username: "alice".to_owned(),
            password: SecretString::from("secret".to_owned()),
            ..OAuth2Request::default()
        }
    }

    fn refresh_request() -> OAuth2Request {
        OAuth2Request {
            grant_type: "refresh_token".to_owned(),
            service: "registry.example.com".to_owned(),
            client_id: "docker".to_owned(),
            refresh_token: SecretString::from("token".to_owned()),
            ..OAuth2Request::default()
        }
    }

    fn assert_invalid(request: &OAuth2Request, message: &str) {
        match request.validate() {
            Err(RegistryAuthError::InvalidRequest(msg)) => assert_eq!(msg, message),
            other => panic!("expected InvalidRequest({message:?}), got {other:?}"),
        }
    }

    #[test]
    fn token_request_requires_service() {
        let request = TokenRequest::default();
        assert!(matches!(
            request.validate(),
            Err(RegistryAuthError::InvalidRequest(_))
        ));

        let request = TokenRequest {
            service: "registry.example.com".to_owned(),
            ..TokenRequest::default()
        };
        assert!(request.validate().is_ok());
        assert!(request.is_anonymous());
    }

    #[test]
    fn valid_oauth2_requests_pass() {
        assert!(password_request().validate().is_ok());
        assert!(refresh_request().validate().is_ok());

        for access_type in ["online", "offline"] {
            let request = OAuth2Request {
                access_type: access_type.to_owned(),
                ..refresh_request()
            };
            assert!(request.validate().is_ok(), "{access_type}");
        }
    }

    #[test]
    fn oauth2_requires_service_and_client_id() {
        let request = OAuth2Request {
            service: String::new(),
            ..password_request()
        };
        assert_invalid(&request, "service is required");

        let request = OAuth2Request {
            client_id: String::new(),
            ..password_request()
        };
        assert_invalid(&request, "client ID is required");
    }

    #[test]
    fn oauth2_rejects_missing_or_unknown_grant_type() {
        let request = OAuth2Request {
            grant_type: String::new(),
            ..password_request()
        };
        assert_invalid(&request, "missing grant_type value");

        let request = OAuth2Request {
            grant_type: "client_credentials".to_owned(),
            ..password_request()
        };
        assert_invalid(&request, "unknown grant_type value");
    }

    #[test]
    fn password_grant_requires_credentials() {
        let request = OAuth2Request {
            username: String::new(),
            ..password_request()
        };
        assert_invalid(&request, "missing username value");

        let request = OAuth2Request {
            password: SecretString::from(String::new()),
            ..password_request()
        };
        assert_invalid(&request, "missing password value");
    }

    #[test]
    fn refresh_grant_requires_token() {
        let request = OAuth2Request {
            refresh_token: SecretString::from(String::new()),
            ..refresh_request()
        };
        assert_invalid(&request, "missing refresh_token value");
    }

    #[test]
    fn oauth2_rejects_unknown_access_type() {
        let request = OAuth2Request {
            access_type: "forever".to_owned(),
            ..password_request()
        };
        assert_invalid(&request, "unknown access_type value");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let rendered = format!("{:?}", password_request());
        assert!(!rendered.contains("secret"));

        let rendered = format!("{:?}", PasswordCredentials::new("alice", "hunter2"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn responses_omit_empty_fields() {
        let response = TokenResponse {
            token: "abc".to_owned(),
            refresh_token: None,
            expires_in: Some(900),
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"access_token":"abc","expires_in":900}"#
        );

        let response = OAuth2Response {
            token: "abc".to_owned(),
            scope: None,
            expires_in: None,
            issued_at: None,
            refresh_token: None,
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"access_token":"abc"}"#
        );
    }
}
