use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::get;
use axum::Router;
use common_auth::JwtVerifier;

use crate::seller_handlers::{
    list_private_sellers, list_public_sellers, list_role_sellers, list_tenant_sellers,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub jwt_verifier: Arc<JwtVerifier>,
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_verifier.clone()
    }
}

async fn health() -> &'static str {
    "ok"
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/public/sellers", get(list_public_sellers))
        .route("/api/private/sellers", get(list_private_sellers))
        .route("/api/private-role/sellers", get(list_role_sellers))
        .route("/api/tenat/sellers/:id", get(list_tenant_sellers))
        .with_state(state)
}
