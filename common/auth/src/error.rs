use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::errors::ErrorKind;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Every way an authorization attempt can be rejected.
///
/// The `Display` output is the client-facing description. Variants carrying a
/// `String` keep the underlying detail for logs only.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,
    #[error("{0}")]
    MalformedHeader(&'static str),
    #[error("Authorization malformed.")]
    MissingKeyId,
    #[error("Unable to find the appropriate key.")]
    KeyNotFound(String),
    #[error("Token is signed with an algorithm that is not accepted.")]
    UnsupportedAlgorithm(String),
    #[error("Token expired.")]
    ExpiredToken,
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims(String),
    #[error("Unable to parse authentication token.")]
    MalformedToken(String),
    #[error("Permissions not included in JWT.")]
    MissingPermissionsClaim,
    #[error("The user doesn't have permission to perform this action.")]
    PermissionDenied { required: String },
    #[error("Unable to fetch signing keys from the issuer.")]
    JwksUnavailable(String),
}

impl AuthError {
    /// Machine-readable error code rendered in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader
            | AuthError::MalformedHeader(_)
            | AuthError::MissingKeyId
            | AuthError::KeyNotFound(_)
            | AuthError::UnsupportedAlgorithm(_)
            | AuthError::MalformedToken(_)
            | AuthError::PermissionDenied { .. } => "invalid_header",
            AuthError::ExpiredToken => "token_expired",
            AuthError::InvalidClaims(_) | AuthError::MissingPermissionsClaim => "invalid_claims",
            AuthError::JwksUnavailable(_) => "jwks_unavailable",
        }
    }

    /// Malformed token bodies and a missing `permissions` claim are client
    /// errors (400); everything else about the credential is a 401.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::UnsupportedAlgorithm(_)
            | AuthError::MalformedToken(_)
            | AuthError::MissingPermissionsClaim => StatusCode::BAD_REQUEST,
            AuthError::JwksUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        match value.kind() {
            ErrorKind::ExpiredSignature => Self::ExpiredToken,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => Self::InvalidClaims(value.to_string()),
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::UnsupportedAlgorithm(value.to_string())
            }
            _ => Self::MalformedToken(value.to_string()),
        }
    }
}

impl From<AuthError> for (StatusCode, String) {
    fn from(value: AuthError) -> Self {
        (value.status(), value.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
    status_code: u16,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    description: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code,
                description: self.description(),
            },
            status_code: status.as_u16(),
        };

        let mut resp = (status, Json(body)).into_response();
        resp.headers_mut()
            .insert("X-Error-Code", HeaderValue::from_static(code));
        resp
    }
}
