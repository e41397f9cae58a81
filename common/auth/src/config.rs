/// Runtime configuration for JWT verification.
///
/// Each toggle mirrors one knob of the upstream identity provider contract:
/// issuer, audience, lifetime, and signature checks can be switched off
/// individually for environments that terminate validation elsewhere.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Expected issuer claim (iss), checked when `validate_issuer` is set.
    pub issuer: Option<String>,
    /// Expected audience claim (aud), checked when `validate_audience` is set.
    pub audience: Option<String>,
    pub validate_issuer: bool,
    pub validate_audience: bool,
    /// Whether exp is enforced during decoding.
    pub validate_lifetime: bool,
    /// Whether the token signature is enforced during decoding.
    pub validate_signature: bool,
    /// Whether 401 bodies carry the underlying verification error message.
    pub include_error_details: bool,
    /// Allowable clock skew in seconds when validating exp/nbf.
    pub leeway_seconds: u32,
}

impl JwtConfig {
    /// Construct config that validates everything (30 second leeway).
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: Some(issuer.into()),
            audience: Some(audience.into()),
            validate_issuer: true,
            validate_audience: true,
            validate_lifetime: true,
            validate_signature: true,
            include_error_details: false,
            leeway_seconds: 30,
        }
    }

    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn with_validate_issuer(mut self, enabled: bool) -> Self {
        self.validate_issuer = enabled;
        self
    }

    pub fn with_validate_audience(mut self, enabled: bool) -> Self {
        self.validate_audience = enabled;
        self
    }

    pub fn with_validate_lifetime(mut self, enabled: bool) -> Self {
        self.validate_lifetime = enabled;
        self
    }

    pub fn with_validate_signature(mut self, enabled: bool) -> Self {
        self.validate_signature = enabled;
        self
    }

    pub fn with_error_details(mut self, enabled: bool) -> Self {
        self.include_error_details = enabled;
        self
    }
}
