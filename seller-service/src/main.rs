use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use common_auth::JwtVerifier;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use seller_service::app::{build_router, AppState};
use seller_service::config::load_auth_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_auth_settings()?;

    let mut builder = JwtVerifier::builder(settings.jwt_config());
    if let Some(pem) = &settings.public_key_pem {
        builder = builder.with_rsa_pem(settings.public_key_kid.clone(), pem.as_bytes())?;
    }
    if let Some(jwks_url) = settings.jwks_url() {
        info!(%jwks_url, "loading decoding keys from authority");
        builder = builder.with_jwks_url(jwks_url);
    }
    let verifier = builder.build().await?;

    let state = AppState {
        jwt_verifier: Arc::new(verifier),
    };

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:5173"),
        ]))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static("authorization"),
        ]);

    let app = build_router(state).layer(cors);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let ip: std::net::IpAddr = host.parse()?;
    let addr = SocketAddr::from((ip, port));

    println!("starting seller-service on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
