use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::error::{AuthError, AuthResult};

/// Pulls the bearer token out of a raw `Authorization` header value.
///
/// The value must be exactly `<scheme> <token>` separated by one space, with a
/// case-insensitive `bearer` scheme. The token is returned as-is.
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let raw = header.ok_or(AuthError::MissingHeader)?;

    let parts: Vec<&str> = raw.split(' ').collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(AuthError::MalformedHeader(
            "Authorization header must be bearer token.",
        ));
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader(
            "Authorization header must start with \"Bearer\".",
        ));
    }

    if token.is_empty() {
        return Err(AuthError::MalformedHeader(
            "Authorization header must be bearer token.",
        ));
    }

    Ok(*token)
}

/// Reads the `Authorization` header from a request's headers.
///
/// A header that is present but not visible ASCII is malformed, not missing.
pub fn authorization_header(headers: &HeaderMap) -> AuthResult<Option<&str>> {
    match headers.get(AUTHORIZATION) {
        Some(value) => value.to_str().map(Some).map_err(|_| {
            AuthError::MalformedHeader("Authorization header contains invalid characters.")
        }),
        None => Ok(None),
    }
}
