use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};

use crate::claims::Claims;
use crate::error::{AuthError, AuthRejection, AuthResult};
use crate::verifier::JwtVerifier;

/// Extracts verified JWT claims from the request using the configured verifier.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub token: String,
}

impl AuthContext {
    pub fn has_role(&self, role: &str) -> bool {
        self.claims.has_role(role)
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

/// Like [`AuthContext`] but tolerates an absent authorization header, so
/// handlers can hand `None` to the access gate and get `Unauthenticated`
/// back. A header that is present but fails verification is still a 401
/// rejection; at this layer it is indistinguishable from no token.
#[derive(Debug, Clone)]
pub struct MaybeAuthContext(pub Option<AuthContext>);

impl MaybeAuthContext {
    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref().map(|ctx| &ctx.claims)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<JwtVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<JwtVerifier>::from_ref(state);
        let include_details = verifier.config().include_error_details;

        verify_bearer(parts, &verifier).map_err(|error| AuthRejection {
            error,
            include_details,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthContext
where
    Arc<JwtVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if parts.headers.get(AUTHORIZATION).is_none() {
            return Ok(Self(None));
        }

        let context = AuthContext::from_request_parts(parts, state).await?;
        Ok(Self(Some(context)))
    }
}

fn verify_bearer(parts: &Parts, verifier: &JwtVerifier) -> AuthResult<AuthContext> {
    let header_value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?;

    let token = parse_bearer(header_value)?;
    let claims = verifier.verify(&token)?;

    Ok(AuthContext { claims, token })
}

fn parse_bearer(value: &axum::http::HeaderValue) -> AuthResult<String> {
    let raw = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?
        .trim();

    let token = raw
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthorization)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }

    Ok(token.to_owned())
}
