use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Application-focused representation of verified JWT claims.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    pub subject: Option<String>,
    pub tenant_id: Option<String>,
    pub roles: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
    pub issuer: Option<String>,
    pub audience: Vec<String>,
    pub raw: serde_json::Value,
}

impl Claims {
    /// Convenience helper for role checks. Matching is case-sensitive.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|value| value == role)
    }

    /// Exact string comparison against the `tenantId` claim.
    pub fn tenant_matches(&self, tenant_id: &str) -> bool {
        self.tenant_id.as_deref() == Some(tenant_id)
    }
}

#[derive(Debug, Deserialize)]
struct ClaimsRepr {
    #[serde(default)]
    sub: Option<String>,
    #[serde(rename = "tenantId", default)]
    tenant_id: Option<String>,
    #[serde(rename = "role", default)]
    role: Option<OneOrMany>,
    exp: i64,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    aud: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Single(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::Single(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        let expires_at = Utc
            .timestamp_opt(value.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("exp", value.exp.to_string()))?;

        let issued_at = match value.iat {
            Some(iat) => Some(
                Utc.timestamp_opt(iat, 0)
                    .single()
                    .ok_or_else(|| AuthError::InvalidClaim("iat", iat.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            subject: value.sub,
            tenant_id: value.tenant_id,
            roles: value.role.map(OneOrMany::into_vec).unwrap_or_default(),
            expires_at,
            issued_at,
            issuer: value.iss,
            audience: value.aud.map(OneOrMany::into_vec).unwrap_or_default(),
            raw: serde_json::Value::Null,
        })
    }
}

impl TryFrom<serde_json::Value> for Claims {
    type Error = AuthError;

    fn try_from(value: serde_json::Value) -> AuthResult<Self> {
        let repr: ClaimsRepr = serde_json::from_value(value.clone())
            .map_err(|err| AuthError::InvalidJson(err.to_string()))?;
        let mut claims = Claims::try_from(repr)?;
        claims.raw = value;
        Ok(claims)
    }
}
