//! Domain layer of the registry token service.

pub mod authn;
pub mod authz;
pub mod error_handler;
pub mod logging;
pub mod service;

pub use authn::{Authenticator, DefaultRefreshTokenAuthenticator};
pub use authz::{DefaultAuthorizer, DefaultRepositoryAuthorizer};
pub use error_handler::{ErrorHandler, NoopErrorHandler, TracingErrorHandler};
pub use logging::LoggingTokenService;
pub use service::{TokenIssuer, TokenServiceImpl};
