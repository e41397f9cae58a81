use anyhow::{bail, Result};
use std::env;

use common_auth::JwtConfig;

/// Token-validation settings, sourced from `AUTH_*` environment variables.
/// The knob set mirrors what the upstream identity provider contract
/// exposes: issuer, audience, lifetime, signing-key, and metadata checks.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub require_https_metadata: bool,
    pub authority: Option<String>,
    pub include_error_details: bool,
    pub validate_audience: bool,
    pub valid_audience: Option<String>,
    pub validate_issuer_signing_key: bool,
    pub validate_issuer: bool,
    pub valid_issuer: Option<String>,
    pub validate_lifetime: bool,
    /// Static RSA public key for environments without a JWKS endpoint.
    pub public_key_pem: Option<String>,
    pub public_key_kid: String,
}

impl AuthSettings {
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            issuer: self.valid_issuer.clone(),
            audience: self.valid_audience.clone(),
            validate_issuer: self.validate_issuer,
            validate_audience: self.validate_audience,
            validate_lifetime: self.validate_lifetime,
            validate_signature: self.validate_issuer_signing_key,
            include_error_details: self.include_error_details,
            leeway_seconds: 30,
        }
    }

    /// Discovery URL for decoding keys, derived from the authority.
    pub fn jwks_url(&self) -> Option<String> {
        self.authority.as_ref().map(|authority| {
            format!(
                "{}/.well-known/jwks.json",
                authority.trim_end_matches('/')
            )
        })
    }
}

pub fn load_auth_settings() -> Result<AuthSettings> {
    let require_https_metadata = bool_from_env("AUTH_REQUIRE_HTTPS_METADATA").unwrap_or(false);
    let authority = env::var("AUTH_AUTHORITY")
        .ok()
        .and_then(|value| normalize_optional(&value));

    if require_https_metadata {
        if let Some(authority) = &authority {
            if !authority.starts_with("https://") {
                bail!("AUTH_AUTHORITY must use https when AUTH_REQUIRE_HTTPS_METADATA is set, got '{authority}'");
            }
        }
    }

    let public_key_pem = env::var("AUTH_JWT_PUBLIC_KEY_PEM")
        .ok()
        .and_then(|value| normalize_optional(&value));
    let public_key_kid = env::var("AUTH_JWT_KID").unwrap_or_else(|_| "default".to_string());

    if authority.is_none() && public_key_pem.is_none() {
        bail!("Either AUTH_AUTHORITY or AUTH_JWT_PUBLIC_KEY_PEM must be configured");
    }

    Ok(AuthSettings {
        require_https_metadata,
        authority,
        include_error_details: bool_from_env("AUTH_INCLUDE_ERROR_DETAILS").unwrap_or(false),
        validate_audience: bool_from_env("AUTH_VALIDATE_AUDIENCE").unwrap_or(false),
        valid_audience: env::var("AUTH_VALID_AUDIENCE")
            .ok()
            .and_then(|value| normalize_optional(&value)),
        validate_issuer_signing_key: bool_from_env("AUTH_VALIDATE_ISSUER_SIGNING_KEY")
            .unwrap_or(true),
        validate_issuer: bool_from_env("AUTH_VALIDATE_ISSUER").unwrap_or(false),
        valid_issuer: env::var("AUTH_VALID_ISSUER")
            .ok()
            .and_then(|value| normalize_optional(&value)),
        validate_lifetime: bool_from_env("AUTH_VALIDATE_LIFETIME").unwrap_or(true),
        public_key_pem,
        public_key_kid,
    })
}

fn bool_from_env(key: &str) -> Option<bool> {
    env::var(key).ok().map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
