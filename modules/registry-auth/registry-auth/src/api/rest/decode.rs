//! Request decoding for the token endpoints.
//!
//! Unknown parameters are ignored. When a single-valued parameter is
//! repeated, the last occurrence wins.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use http::HeaderMap;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use registry_auth_sdk::{
    OAuth2Request, PasswordCredentials, RegistryAuthError, TokenRequest, parse_scopes,
};
use secrecy::SecretString;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decode a token request from the query string and the `Authorization` header.
///
/// Requests without valid HTTP Basic credentials are anonymous.
///
/// # Errors
///
/// - `InvalidRequest` if `offline_token` is not a boolean
/// - `InvalidScope` if a `scope` parameter is malformed
pub fn decode_token_request(
    query: Option<&str>,
    headers: &HeaderMap,
) -> Result<TokenRequest, RegistryAuthError> {
    let mut request = TokenRequest::default();
    let mut scopes = Vec::new();

    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        match key.as_ref() {
            "service" => request.service = value.into_owned(),
            "client_id" => request.client_id = value.into_owned(),
            "offline_token" => request.offline = parse_bool(&value)?,
            "scope" => scopes.push(value.into_owned()),
            _ => {}
        }
    }

    request.scopes = parse_scopes(&scopes)?;
    request.credentials = basic_auth(headers);

    Ok(request)
}

/// Decode an `OAuth2` token request from a form encoded body.
///
/// Bodies of any other content type decode as an empty form.
///
/// # Errors
///
/// - `InvalidScope` if a `scope` parameter is malformed
pub fn decode_oauth2_request(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<OAuth2Request, RegistryAuthError> {
    let mut request = OAuth2Request::default();
    let mut scopes = Vec::new();

    let form = if is_form(headers) { body } else { &[] };

    for (key, value) in url::form_urlencoded::parse(form) {
        match key.as_ref() {
            "grant_type" => request.grant_type = value.into_owned(),
            "service" => request.service = value.into_owned(),
            "client_id" => request.client_id = value.into_owned(),
            "access_type" => request.access_type = value.into_owned(),
            "scope" => scopes.push(value.into_owned()),
            "username" => request.username = value.into_owned(),
            "password" => request.password = SecretString::from(value.into_owned()),
            "refresh_token" => request.refresh_token = SecretString::from(value.into_owned()),
            _ => {}
        }
    }

    request.scopes = parse_scopes(&scopes)?;

    Ok(request)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Accepts `1`, `t`, `true` and `0`, `f`, `false` (lower, upper or title case).
/// Empty means `false`.
fn parse_bool(value: &str) -> Result<bool, RegistryAuthError> {
    match value {
        "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        _ => Err(RegistryAuthError::invalid_request(format!(
            "invalid offline_token value \"{value}\""
        ))),
    }
}

fn basic_auth(headers: &HeaderMap) -> Option<PasswordCredentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;

    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(PasswordCredentials::new(username, password))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use http::HeaderValue;
    use secrecy::ExposeSecret;

    use super::*;

    fn basic(credentials: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(credentials))).unwrap(),
        );
        headers
    }

    fn form() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        headers
    }

    #[test]
    fn decodes_token_query() {
        let request = decode_token_request(
            Some(
                "service=registry.example.com&client_id=docker&offline_token=true\
                 &scope=repository%3Aalice%2Fapp%3Apull%2Cpush&scope=registry:catalog:*&foo=bar",
            ),
            &basic("alice:pa:ss"),
        )
        .unwrap();

        assert_eq!(request.service, "registry.example.com");
        assert_eq!(request.client_id, "docker");
        assert!(request.offline);
        assert_eq!(
            request.scopes.to_string(),
            "repository:alice/app:pull,push registry:catalog:*"
        );

        let credentials = request.credentials.unwrap();
        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.password.expose_secret(), "pa:ss");
    }

    #[test]
    fn missing_or_malformed_basic_auth_is_anonymous() {
        let request = decode_token_request(Some("service=registry"), &HeaderMap::new()).unwrap();
        assert!(request.is_anonymous());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        let request = decode_token_request(None, &headers).unwrap();
        assert!(request.is_anonymous());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic !!!"));
        let request = decode_token_request(None, &headers).unwrap();
        assert!(request.is_anonymous());

        let request = decode_token_request(None, &basic("no-colon")).unwrap();
        assert!(request.is_anonymous());
    }

    #[test]
    fn basic_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("basic {}", STANDARD.encode("alice:secret"))).unwrap(),
        );

        let request = decode_token_request(None, &headers).unwrap();
        assert_eq!(request.credentials.unwrap().username, "alice");
    }

    #[test]
    fn offline_token_accepts_boolean_literals() {
        for (raw, expected) in [("1", true), ("T", true), ("False", false), ("", false)] {
            let request =
                decode_token_request(Some(&format!("offline_token={raw}")), &HeaderMap::new())
                    .unwrap();
            assert_eq!(request.offline, expected, "{raw:?}");
        }

        assert!(matches!(
            decode_token_request(Some("offline_token=yes"), &HeaderMap::new()),
            Err(RegistryAuthError::InvalidRequest(_))
        ));
    }

    #[test]
    fn invalid_scope_fails_decoding() {
        assert!(matches!(
            decode_token_request(Some("scope=repository:alice"), &HeaderMap::new()),
            Err(RegistryAuthError::InvalidScope(_))
        ));
    }

    #[test]
    fn decodes_oauth2_form() {
        let body = "grant_type=password&service=registry.example.com&client_id=docker\
                    &access_type=offline&scope=repository:alice/app:pull\
                    &username=alice&password=s%26cret";

        let request = decode_oauth2_request(&form(), body.as_bytes()).unwrap();

        assert_eq!(request.grant_type, "password");
        assert_eq!(request.service, "registry.example.com");
        assert_eq!(request.client_id, "docker");
        assert_eq!(request.access_type, "offline");
        assert_eq!(request.scopes.to_string(), "repository:alice/app:pull");
        assert_eq!(request.username, "alice");
        assert_eq!(request.password.expose_secret(), "s&cret");
        assert!(request.refresh_token.expose_secret().is_empty());
    }

    #[test]
    fn last_value_wins() {
        let request =
            decode_oauth2_request(&form(), b"service=first&service=second").unwrap();
        assert_eq!(request.service, "second");
    }

    #[test]
    fn non_form_body_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let request = decode_oauth2_request(&headers, b"grant_type=password").unwrap();
        assert!(request.grant_type.is_empty());

        let request = decode_oauth2_request(&HeaderMap::new(), b"grant_type=password").unwrap();
        assert!(request.grant_type.is_empty());
    }
}
