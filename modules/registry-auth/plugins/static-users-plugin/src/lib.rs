#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Users Plugin
//!
//! Password authenticator and subject repository backed by a fixed list of
//! users with bcrypt password hashes. Usernames double as subject ids.
//!
//! ## Configuration
//!
//! ```yaml
//! users:
//!   - username: alice
//!     password_hash: "$2y$10$..."
//!     attributes:
//!       name: Alice
//!   - username: bob
//!     password_hash: "$2y$10$..."
//!     enabled: false
//! ```

pub mod config;
pub mod domain;

pub use config::{StaticUsersPluginConfig, UserConfig};
pub use domain::{BcryptVerifier, PasswordVerifier, User, UserAuthenticator};
