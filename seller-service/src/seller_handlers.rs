use axum::extract::Path;
use axum::Json;
use common_auth::{ensure, AccessRequirement, GateError, MaybeAuthContext, ROLE_VIEW_SELLER};

use crate::catalog::{sellers, Seller};

/// GET /api/public/sellers — anonymous access.
pub async fn list_public_sellers() -> Json<&'static [Seller]> {
    Json(sellers())
}

/// GET /api/private/sellers — any verified token.
pub async fn list_private_sellers(
    auth: MaybeAuthContext,
) -> Result<Json<&'static [Seller]>, GateError> {
    ensure(auth.claims(), AccessRequirement::Authenticated)?;
    Ok(Json(sellers()))
}

/// GET /api/private-role/sellers — verified token with the view-seller role.
pub async fn list_role_sellers(
    auth: MaybeAuthContext,
) -> Result<Json<&'static [Seller]>, GateError> {
    ensure(auth.claims(), AccessRequirement::Role(ROLE_VIEW_SELLER))?;
    Ok(Json(sellers()))
}

/// GET /api/tenat/sellers/:id — verified token whose tenantId claim matches
/// the path tenant. The path spelling is part of the published contract.
pub async fn list_tenant_sellers(
    Path(tenant_id): Path<String>,
    auth: MaybeAuthContext,
) -> Result<Json<&'static [Seller]>, GateError> {
    ensure(auth.claims(), AccessRequirement::TenantMatch(&tenant_id))?;
    Ok(Json(sellers()))
}
