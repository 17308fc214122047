use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Header, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::jwks::SigningKey;

/// Reads the unverified header of a token.
pub fn token_header(token: &str) -> AuthResult<Header> {
    decode_header(token).map_err(|err| AuthError::MalformedToken(err.to_string()))
}

/// Reads the `kid` of a token without verifying it.
pub fn key_id(token: &str) -> AuthResult<String> {
    token_header(token)?.kid.ok_or(AuthError::MissingKeyId)
}

/// Checks signature and standard claims of a token against a resolved key.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    config: Arc<AuthConfig>,
}

impl TokenVerifier {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn verify(&self, token: &str, key: &SigningKey) -> AuthResult<Claims> {
        let header = token_header(token)?;
        if !self.config.algorithms.contains(&header.alg) {
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }

        let decoding_key = key.decoding_key()?;

        // Pin validation to the declared algorithm; jsonwebtoken then rejects it
        // when it does not belong to the key's family.
        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = self.config.leeway_seconds.into();

        let token_data = decode::<Value>(token, &decoding_key, &validation)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(kid = %key.kid, "verified JWT successfully");
        Ok(claims)
    }
}
