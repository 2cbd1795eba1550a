pub mod service;
pub mod user;
pub mod verifier;

pub use service::UserAuthenticator;
pub use user::User;
pub use verifier::{BcryptVerifier, PasswordVerifier};
