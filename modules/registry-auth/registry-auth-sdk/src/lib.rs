#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Registry Auth SDK
//!
//! This crate provides the public API of the registry token authentication
//! service (Docker / OCI Distribution token and `OAuth2` token endpoints):
//!
//! - [`Scope`], [`Scopes`], [`Resource`] - Token scope grammar and comparison
//! - [`Subject`], [`SubjectId`] - Authenticated identity abstraction
//! - [`TokenService`] - Public API trait consumed by transport adapters
//! - [`PasswordAuthenticator`], [`RefreshTokenAuthenticator`], [`Authorizer`],
//!   [`AccessTokenIssuer`], [`RefreshTokenIssuer`] - Pipeline stage traits
//! - [`RepositoryAuthorizer`], [`SubjectRepository`], [`RefreshTokenVerifier`] -
//!   Plugin traits for policy and identity backends
//! - [`RegistryAuthError`] - Error kinds
//!
//! ## Usage
//!
//! ```ignore
//! use registry_auth_sdk::{TokenRequest, TokenService, parse_scopes};
//!
//! let request = TokenRequest {
//!     service: "registry.example.com".to_owned(),
//!     client_id: "docker".to_owned(),
//!     offline: false,
//!     scopes: parse_scopes(["repository:alice/app:pull,push"])?,
//!     credentials: None,
//! };
//!
//! let response = service.handle_token(&request).await?;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;
pub mod scope;
pub mod subject;

// Re-export main types at crate root
pub use api::{
    AccessTokenIssuer, Authorizer, PasswordAuthenticator, RefreshTokenAuthenticator,
    RefreshTokenIssuer, TokenService,
};
pub use error::RegistryAuthError;
pub use models::{
    AccessToken, AccessType, GrantType, OAuth2Request, OAuth2Response, PasswordCredentials,
    TokenRequest, TokenResponse,
};
pub use plugin_api::{RefreshTokenVerifier, RepositoryAuthorizer, SubjectRepository};
pub use scope::{Resource, Scope, Scopes, parse_scope, parse_scopes};
pub use subject::{SUBJECT_NAME, SUBJECT_TYPE, Subject, SubjectId, subject_name};
