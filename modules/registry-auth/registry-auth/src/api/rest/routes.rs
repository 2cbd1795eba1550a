use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};
use registry_auth_sdk::TokenService;

use crate::api::rest::handlers;
use crate::domain::ErrorHandler;

/// Build the token endpoint router.
///
/// `GET {path}` serves token requests and `POST {path}` `OAuth2` requests.
/// Errors that cannot be returned to the client go to `error_handler`.
pub fn router(
    path: &str,
    service: Arc<dyn TokenService>,
    error_handler: Arc<dyn ErrorHandler>,
) -> Router {
    Router::new()
        .route(path, get(handlers::token).post(handlers::oauth2))
        .layer(Extension(service))
        .layer(Extension(error_handler))
}
