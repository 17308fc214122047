//! Bearer-token authorization for the Casting Agency API.
//!
//! A request is admitted by [`Authorizer::authorize`], which extracts the
//! bearer token, resolves the issuer's signing key from its JWKS, verifies the
//! token and finally checks the permission the operation requires.

pub mod authorizer;
pub mod bearer;
pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod gate;
pub mod jwks;
pub mod permissions;
pub mod verifier;

pub use authorizer::Authorizer;
pub use bearer::bearer_token;
pub use claims::Claims;
pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, AuthResult};
pub use extractors::{ensure_permission, require_permission, AuthContext};
pub use gate::check_permission;
pub use jwks::{JwksCache, JwksFetcher, KeySet, SigningKey};
pub use verifier::TokenVerifier;
