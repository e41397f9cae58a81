pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod gate;
pub mod jwks;
pub mod roles;
pub mod verifier;

pub use claims::Claims;
pub use config::JwtConfig;
pub use error::{AuthError, AuthRejection, AuthResult};
pub use extractors::{AuthContext, MaybeAuthContext};
pub use gate::{ensure, evaluate, AccessDecision, AccessRequirement, GateError};
pub use jwks::JwksFetcher;
pub use roles::ROLE_VIEW_SELLER;
pub use verifier::{InMemoryKeyStore, JwtVerifier, JwtVerifierBuilder};
