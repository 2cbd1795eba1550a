//! HTTP adapter for the token service.
//!
//! `GET` serves the Docker token protocol, `POST` the `OAuth2` form protocol.

pub mod decode;
pub mod error;
pub mod handlers;
pub mod routes;

pub use routes::router;
