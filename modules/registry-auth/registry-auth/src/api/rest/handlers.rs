use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Extension, RawQuery};
use axum::response::{IntoResponse, Response};
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, StatusCode};
use registry_auth_sdk::TokenService;
use serde::Serialize;

use crate::api::rest::decode::{decode_oauth2_request, decode_token_request};
use crate::api::rest::error::{error_response, status_response};
use crate::domain::ErrorHandler;

/// `GET` token endpoint: Docker token protocol.
pub async fn token(
    Extension(service): Extension<Arc<dyn TokenService>>,
    Extension(errors): Extension<Arc<dyn ErrorHandler>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let request = match decode_token_request(query.as_deref(), &headers) {
        Ok(request) => request,
        Err(e) => {
            errors.handle("decoding token request", &e);
            return error_response(&e);
        }
    };

    match service.handle_token(&request).await {
        Ok(response) => json_response(&response, errors.as_ref(), "encoding token response"),
        Err(e) => error_response(&e),
    }
}

/// `POST` token endpoint: `OAuth2` password and refresh token grants.
pub async fn oauth2(
    Extension(service): Extension<Arc<dyn TokenService>>,
    Extension(errors): Extension<Arc<dyn ErrorHandler>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match decode_oauth2_request(&headers, &body) {
        Ok(request) => request,
        Err(e) => {
            errors.handle("decoding oauth2 token request", &e);
            return error_response(&e);
        }
    };

    match service.handle_oauth2(&request).await {
        Ok(response) => json_response(
            &response,
            errors.as_ref(),
            "encoding oauth2 token response",
        ),
        Err(e) => error_response(&e),
    }
}

fn json_response<T: Serialize>(value: &T, errors: &dyn ErrorHandler, context: &str) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            body,
        )
            .into_response(),
        Err(e) => {
            errors.handle(context, &e);
            status_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
