use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::jwks::JwksFetcher;

/// Thread-safe store for decoding keys loaded from JWKS/PEM sources.
#[derive(Clone, Default)]
pub struct InMemoryKeyStore {
    inner: Arc<RwLock<HashMap<String, DecodingKey>>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_key(&self, kid: impl Into<String>, key: DecodingKey) {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        guard.insert(kid.into(), key);
    }

    pub fn insert_rsa_pem(&self, kid: impl Into<String>, pem: &[u8]) -> AuthResult<()> {
        let kid = kid.into();
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|err| AuthError::KeyParse(kid.clone(), err.to_string()))?;
        self.insert_key(kid, key);
        Ok(())
    }

    pub fn get(&self, kid: &str) -> Option<DecodingKey> {
        let guard = self.inner.read().expect("rwlock poisoned");
        guard.get(kid).cloned()
    }

    pub fn contains(&self, kid: &str) -> bool {
        let guard = self.inner.read().expect("rwlock poisoned");
        guard.contains_key(kid)
    }

    pub fn replace_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, DecodingKey)>,
    {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        guard.clear();
        for (kid, key) in entries.into_iter() {
            guard.insert(kid, key);
        }
    }
}

#[derive(Clone)]
pub struct JwtVerifier {
    config: JwtConfig,
    store: InMemoryKeyStore,
    jwks: Option<JwksFetcher>,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config,
            store: InMemoryKeyStore::new(),
            jwks: None,
        }
    }

    pub fn with_store(config: JwtConfig, store: InMemoryKeyStore) -> Self {
        Self {
            config,
            store,
            jwks: None,
        }
    }

    pub fn builder(config: JwtConfig) -> JwtVerifierBuilder {
        JwtVerifierBuilder::new(config)
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn store(&self) -> &InMemoryKeyStore {
        &self.store
    }

    pub fn jwks_fetcher(&self) -> Option<&JwksFetcher> {
        self.jwks.as_ref()
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = self.config.leeway_seconds.into();
        validation.validate_exp = self.config.validate_lifetime;

        validation.validate_aud = false;
        if self.config.validate_audience {
            if let Some(audience) = &self.config.audience {
                validation.set_audience(&[audience.clone()]);
                validation.validate_aud = true;
            }
        }

        if self.config.validate_issuer {
            if let Some(issuer) = &self.config.issuer {
                validation.set_issuer(&[issuer.clone()]);
            }
        }

        if !self.config.validate_signature {
            validation.insecure_disable_signature_validation();
        }

        validation
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let header =
            decode_header(token).map_err(|err| AuthError::InvalidHeader(err.to_string()))?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = self
            .store
            .get(&kid)
            .ok_or_else(|| AuthError::UnknownKeyId(kid.clone()))?;

        let token_data = decode::<Value>(token, &key, &self.validation())?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(kid, "verified JWT successfully");
        Ok(claims)
    }

    pub async fn refresh_jwks(&self) -> AuthResult<usize> {
        let fetcher = match &self.jwks {
            Some(fetcher) => fetcher,
            None => return Ok(0),
        };

        let keys = fetcher.fetch().await?;
        let count = keys.len();
        if count > 0 {
            self.store.replace_all(keys);
        }
        Ok(count)
    }
}

pub struct JwtVerifierBuilder {
    config: JwtConfig,
    store: InMemoryKeyStore,
    jwks: Option<JwksFetcher>,
}

impl JwtVerifierBuilder {
    fn new(config: JwtConfig) -> Self {
        Self {
            config,
            store: InMemoryKeyStore::new(),
            jwks: None,
        }
    }

    pub fn with_store(mut self, store: InMemoryKeyStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_decoding_key(self, kid: impl Into<String>, key: DecodingKey) -> Self {
        self.store.insert_key(kid, key);
        self
    }

    pub fn with_rsa_pem(self, kid: impl Into<String>, pem: &[u8]) -> AuthResult<Self> {
        self.store.insert_rsa_pem(kid, pem)?;
        Ok(self)
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks = Some(JwksFetcher::new(url));
        self
    }

    pub fn with_jwks_fetcher(mut self, fetcher: JwksFetcher) -> Self {
        self.jwks = Some(fetcher);
        self
    }

    pub async fn build(self) -> AuthResult<JwtVerifier> {
        let verifier = JwtVerifier {
            config: self.config,
            store: self.store,
            jwks: self.jwks,
        };

        if verifier.jwks.is_some() {
            verifier.refresh_jwks().await?;
        }

        Ok(verifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::Utc;
    use httpmock::prelude::*;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
    use rsa::rand_core::OsRng;
    use rsa::traits::PublicKeyParts;
    use rsa::RsaPrivateKey;
    use serde::Serialize;

    #[derive(Serialize)]
    struct TokenClaims<'a> {
        sub: &'a str,
        #[serde(rename = "tenantId")]
        tenant_id: &'a str,
        role: &'a str,
        iss: &'a str,
        aud: &'a str,
        exp: i64,
        iat: i64,
    }

    struct KeyMaterial {
        encoding: EncodingKey,
        decoding: DecodingKey,
        modulus: String,
        exponent: String,
    }

    fn generate_key_material() -> KeyMaterial {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("key generation");
        let public_key = private_key.to_public_key();

        let private_pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .expect("private pem");
        let public_pem = public_key.to_pkcs1_pem(LineEnding::LF).expect("public pem");

        let encoding = EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("encoding key");
        let decoding = DecodingKey::from_rsa_pem(public_pem.as_bytes()).expect("decoding key");
        let modulus = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let exponent = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

        KeyMaterial {
            encoding,
            decoding,
            modulus,
            exponent,
        }
    }

    fn issue_token(
        encoding: &EncodingKey,
        kid: &str,
        issuer: &str,
        audience: &str,
        expires_in: i64,
    ) -> String {
        let issued_at = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: "user-1",
            tenant_id: "rchlo",
            role: "view-seller",
            iss: issuer,
            aud: audience,
            exp: issued_at + expires_in,
            iat: issued_at,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        encode(&header, &claims, encoding).expect("sign token")
    }

    #[test]
    fn key_store_insert_replace_round_trip() {
        let store = InMemoryKeyStore::new();
        assert!(!store.contains("kid"));
        store.insert_key("kid", DecodingKey::from_secret(b"secret"));
        assert!(store.contains("kid"));
        assert!(store.get("kid").is_some());

        store.replace_all(vec![(
            "another".to_string(),
            DecodingKey::from_secret(b"other"),
        )]);
        assert!(!store.contains("kid"));
        assert!(store.contains("another"));
    }

    #[test]
    fn verifier_accepts_valid_token() {
        let material = generate_key_material();
        let kid = "test-key";
        let config = JwtConfig::new("test-issuer", "test-audience");
        let store = InMemoryKeyStore::new();
        store.insert_key(kid, material.decoding.clone());
        let verifier = JwtVerifier::with_store(config, store);

        let token = issue_token(&material.encoding, kid, "test-issuer", "test-audience", 600);
        let claims = verifier.verify(&token).expect("verification succeeds");

        assert_eq!(claims.subject.as_deref(), Some("user-1"));
        assert_eq!(claims.tenant_id.as_deref(), Some("rchlo"));
        assert_eq!(claims.roles, vec!["view-seller".to_string()]);
        assert_eq!(claims.issuer.as_deref(), Some("test-issuer"));
        assert_eq!(claims.audience, vec!["test-audience".to_string()]);
    }

    #[test]
    fn verifier_rejects_unknown_kid() {
        let material = generate_key_material();
        let kid = "missing";
        let config = JwtConfig::new("issuer", "aud");
        let store = InMemoryKeyStore::new();
        let verifier = JwtVerifier::with_store(config, store);

        let token = issue_token(&material.encoding, kid, "issuer", "aud", 600);
        let err = verifier
            .verify(&token)
            .expect_err("verification should fail");
        match err {
            AuthError::UnknownKeyId(actual) => assert_eq!(actual, kid),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn verifier_rejects_expired_token() {
        let material = generate_key_material();
        let kid = "test-key";
        let config = JwtConfig::new("issuer", "aud").with_leeway(0);
        let store = InMemoryKeyStore::new();
        store.insert_key(kid, material.decoding.clone());
        let verifier = JwtVerifier::with_store(config, store);

        let token = issue_token(&material.encoding, kid, "issuer", "aud", -600);
        let err = verifier
            .verify(&token)
            .expect_err("expired token should fail");
        assert!(matches!(err, AuthError::Verification(_)));
    }

    #[test]
    fn lifetime_toggle_accepts_expired_token() {
        let material = generate_key_material();
        let kid = "test-key";
        let config = JwtConfig::new("issuer", "aud")
            .with_leeway(0)
            .with_validate_lifetime(false);
        let store = InMemoryKeyStore::new();
        store.insert_key(kid, material.decoding.clone());
        let verifier = JwtVerifier::with_store(config, store);

        let token = issue_token(&material.encoding, kid, "issuer", "aud", -600);
        verifier
            .verify(&token)
            .expect("expired token accepted when lifetime is not validated");
    }

    #[test]
    fn audience_toggle_accepts_foreign_audience() {
        let material = generate_key_material();
        let kid = "test-key";
        let store = InMemoryKeyStore::new();
        store.insert_key(kid, material.decoding.clone());

        let strict = JwtVerifier::with_store(
            JwtConfig::new("issuer", "expected-aud"),
            store.clone(),
        );
        let token = issue_token(&material.encoding, kid, "issuer", "other-aud", 600);
        assert!(strict.verify(&token).is_err());

        let relaxed = JwtVerifier::with_store(
            JwtConfig::new("issuer", "expected-aud").with_validate_audience(false),
            store,
        );
        relaxed
            .verify(&token)
            .expect("audience mismatch accepted when audience is not validated");
    }

    #[test]
    fn issuer_toggle_accepts_foreign_issuer() {
        let material = generate_key_material();
        let kid = "test-key";
        let store = InMemoryKeyStore::new();
        store.insert_key(kid, material.decoding.clone());

        let token = issue_token(&material.encoding, kid, "other-issuer", "aud", 600);
        let strict = JwtVerifier::with_store(JwtConfig::new("issuer", "aud"), store.clone());
        assert!(strict.verify(&token).is_err());

        let relaxed = JwtVerifier::with_store(
            JwtConfig::new("issuer", "aud").with_validate_issuer(false),
            store,
        );
        relaxed
            .verify(&token)
            .expect("issuer mismatch accepted when issuer is not validated");
    }

    #[tokio::test]
    async fn refresh_jwks_updates_store() {
        let material = generate_key_material();
        let server = MockServer::start();
        let kid = "fetched-key";
        let body = serde_json::json!({
            "keys": [
                {
                    "kid": kid,
                    "kty": "RSA",
                    "alg": "RS256",
                    "n": material.modulus,
                    "e": material.exponent
                }
            ]
        });

        let _mock = server.mock(|when, then| {
            when.method(GET).path("/jwks");
            then.status(200)
                .header("content-type", "application/json")
                .body(body.to_string());
        });

        let config = JwtConfig::new("issuer", "audience");
        let store = InMemoryKeyStore::new();
        let verifier = JwtVerifier {
            config,
            store,
            jwks: Some(JwksFetcher::new(format!("{}/jwks", server.base_url()))),
        };

        assert!(!verifier.store().contains(kid));
        let refreshed = verifier.refresh_jwks().await.expect("refresh succeeds");
        assert_eq!(refreshed, 1);
        assert!(verifier.store().contains(kid));
    }

    #[tokio::test]
    async fn refresh_jwks_without_fetcher_returns_zero() {
        let config = JwtConfig::new("issuer", "audience");
        let store = InMemoryKeyStore::new();
        let verifier = JwtVerifier::with_store(config, store);

        let refreshed = verifier.refresh_jwks().await.expect("refresh succeeds");
        assert_eq!(refreshed, 0);
    }
}
