use axum::response::{IntoResponse, Response};
use http::header::{CONTENT_TYPE, HeaderValue, X_CONTENT_TYPE_OPTIONS};
use http::StatusCode;
use registry_auth_sdk::RegistryAuthError;

/// Status code a token service error is reported with.
///
/// Credential failures are `401`, anything else is `500`. The body never
/// carries the error message.
#[must_use]
pub fn status_code(err: &RegistryAuthError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Plain text response with the canonical reason phrase of `status`.
#[must_use]
pub fn status_response(status: StatusCode) -> Response {
    let body = format!("{}\n", status.canonical_reason().unwrap_or_default());

    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

/// Convert a token service error into its HTTP response.
#[must_use]
pub fn error_response(err: &RegistryAuthError) -> Response {
    status_response(status_code(err))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[test]
    fn client_errors_are_unauthorized() {
        assert_eq!(
            status_code(&RegistryAuthError::AuthenticationFailed),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_code(&RegistryAuthError::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn other_errors_are_internal() {
        for err in [
            RegistryAuthError::invalid_request("service is required"),
            RegistryAuthError::InvalidScope("repository".to_owned()),
            RegistryAuthError::Signing("boom".to_owned()),
            RegistryAuthError::Internal("boom".to_owned()),
        ] {
            assert_eq!(status_code(&err), StatusCode::INTERNAL_SERVER_ERROR, "{err}");
        }
    }

    #[tokio::test]
    async fn body_is_the_reason_phrase() {
        let response = error_response(&RegistryAuthError::Internal("secret detail".to_owned()));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Internal Server Error\n");
    }
}
