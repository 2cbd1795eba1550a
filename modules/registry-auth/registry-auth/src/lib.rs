#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Registry token service.
//!
//! Implements the token endpoint of a Docker / OCI registry: clients
//! authenticate with a password or a refresh token, requested scopes are
//! narrowed by the authorizer pipeline and the result is signed into a JWT
//! access token.
//!
//! - [`domain`]: authenticators, authorizers, the [`TokenServiceImpl`]
//!   orchestrator and its logging decorator
//! - [`token`]: JWT access and refresh token issuers and signing keys
//! - [`api::rest`]: `axum` router for `GET` and `POST` token requests
//! - [`config`]: service configuration
//!
//! Public types live in `registry-auth-sdk`.

pub mod api;
pub mod config;
pub mod domain;
pub mod token;

pub use config::RegistryAuthConfig;
pub use domain::{LoggingTokenService, TokenServiceImpl};
