use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token missing kid header")]
    MissingKeyId,
    #[error("no decoding key registered for kid '{0}'")]
    UnknownKeyId(String),
    #[error("failed to decode token header: {0}")]
    InvalidHeader(String),
    #[error("token verification failed: {0}")]
    Verification(String),
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("malformed claim payload: {0}")]
    InvalidJson(String),
    #[error("failed to parse decoding key for kid '{0}': {1}")]
    KeyParse(String, String),
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error("failed to fetch JWKS: {0}")]
    JwksFetch(String),
    #[error("failed to parse JWKS response: {0}")]
    JwksDecode(String),
    #[error("JWKS entry missing key id (kid)")]
    JwksMissingKid,
    #[error("JWKS key '{0}' missing required RSA components")]
    JwksMissingComponents(String),
    #[error("JWKS key '{kid}' uses unsupported key type '{kty}'")]
    JwksUnsupportedKey { kid: String, kty: String },
    #[error("JWKS key '{kid}' uses unsupported alg '{alg}'")]
    JwksUnsupportedAlg { kid: String, alg: String },
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Verification(value.to_string())
    }
}

impl AuthError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => {
                (StatusCode::UNAUTHORIZED, "AUTH_HEADER")
            }
            AuthError::MissingKeyId | AuthError::UnknownKeyId(_) => {
                (StatusCode::UNAUTHORIZED, "AUTH_KEY")
            }
            AuthError::InvalidHeader(_)
            | AuthError::Verification(_)
            | AuthError::InvalidClaim(_, _)
            | AuthError::InvalidJson(_) => (StatusCode::UNAUTHORIZED, "AUTH_TOKEN"),
            AuthError::KeyParse(_, _)
            | AuthError::JwksFetch(_)
            | AuthError::JwksDecode(_)
            | AuthError::JwksMissingKid
            | AuthError::JwksMissingComponents(_)
            | AuthError::JwksUnsupportedKey { .. }
            | AuthError::JwksUnsupportedAlg { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_JWKS")
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            code,
            message: Some(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Extractor rejection that honours the `include_error_details` toggle:
/// the stable error code always goes out, the message only when enabled.
#[derive(Debug)]
pub struct AuthRejection {
    pub error: AuthError,
    pub include_details: bool,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code) = self.error.status_and_code();
        let body = ErrorBody {
            code,
            message: self.include_details.then(|| self.error.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
