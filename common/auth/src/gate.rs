use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::claims::Claims;

/// Access tier an endpoint declares for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequirement<'a> {
    /// Anyone may call, with or without a token.
    Public,
    /// Any verified token is enough.
    Authenticated,
    /// Verified token carrying the given role (case-sensitive).
    Role(&'a str),
    /// Verified token whose `tenantId` claim equals the path tenant id.
    TenantMatch(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Unauthenticated,
    Forbidden,
}

/// Pure access decision: claims (or their absence) against a requirement.
///
/// Token validation failures never reach this point; the extractor rejects
/// them with 401 first, so an invalid token and a missing token are
/// indistinguishable here.
pub fn evaluate(claims: Option<&Claims>, requirement: AccessRequirement<'_>) -> AccessDecision {
    match requirement {
        AccessRequirement::Public => AccessDecision::Allow,
        AccessRequirement::Authenticated => match claims {
            Some(_) => AccessDecision::Allow,
            None => AccessDecision::Unauthenticated,
        },
        AccessRequirement::Role(role) => match claims {
            None => AccessDecision::Unauthenticated,
            Some(claims) if claims.has_role(role) => AccessDecision::Allow,
            Some(_) => AccessDecision::Forbidden,
        },
        AccessRequirement::TenantMatch(tenant_id) => match claims {
            None => AccessDecision::Unauthenticated,
            Some(claims) if claims.tenant_matches(tenant_id) => AccessDecision::Allow,
            Some(_) => AccessDecision::Forbidden,
        },
    }
}

/// Gate failure with enough context for the HTTP error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    Unauthenticated,
    MissingRole { required: String },
    TenantMismatch { requested: String },
    Forbidden,
}

/// `evaluate` wrapped into a `?`-friendly result for handlers.
pub fn ensure(
    claims: Option<&Claims>,
    requirement: AccessRequirement<'_>,
) -> Result<(), GateError> {
    match evaluate(claims, requirement) {
        AccessDecision::Allow => Ok(()),
        AccessDecision::Unauthenticated => Err(GateError::Unauthenticated),
        AccessDecision::Forbidden => Err(match requirement {
            AccessRequirement::Role(role) => GateError::MissingRole {
                required: role.to_string(),
            },
            AccessRequirement::TenantMatch(tenant_id) => GateError::TenantMismatch {
                requested: tenant_id.to_string(),
            },
            AccessRequirement::Public | AccessRequirement::Authenticated => GateError::Forbidden,
        }),
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            GateError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "bearer token required".to_string(),
            ),
            GateError::MissingRole { required } => (
                StatusCode::FORBIDDEN,
                "MISSING_ROLE",
                format!("insufficient role, required: {required}"),
            ),
            GateError::TenantMismatch { requested } => (
                StatusCode::FORBIDDEN,
                "TENANT_MISMATCH",
                format!("token tenant does not match requested tenant '{requested}'"),
            ),
            GateError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "access denied".to_string(),
            ),
        };

        let body = ErrorBody { code, message };
        (status, Json(body)).into_response()
    }
}
