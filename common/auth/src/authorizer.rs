use std::sync::Arc;

use tracing::{debug, warn};

use crate::bearer::bearer_token;
use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::AuthResult;
use crate::gate::check_permission;
use crate::jwks::{JwksCache, JwksFetcher};
use crate::verifier::{key_id, TokenVerifier};

/// Runs the whole bearer-token check for one request:
/// header extraction, key resolution, verification, then the permission gate.
///
/// Cheap to clone; every clone shares the same configuration and key cache.
#[derive(Clone)]
pub struct Authorizer {
    config: Arc<AuthConfig>,
    keys: JwksCache,
    verifier: TokenVerifier,
}

impl Authorizer {
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        let fetcher = JwksFetcher::new(config.jwks_url(), config.jwks_timeout)?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: AuthConfig, fetcher: JwksFetcher) -> Self {
        let config = Arc::new(config);
        Self {
            keys: JwksCache::new(fetcher, config.jwks_cache_ttl),
            verifier: TokenVerifier::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn keys(&self) -> &JwksCache {
        &self.keys
    }

    /// Authorizes a request given its raw `Authorization` header value.
    ///
    /// `required` is the permission the protected operation needs; an empty
    /// string admits any verified token.
    pub async fn authorize(
        &self,
        required: &str,
        authorization: Option<&str>,
    ) -> AuthResult<Claims> {
        let result = self.run(required, authorization).await;
        match &result {
            Ok(claims) => debug!(
                required,
                subject = claims.subject.as_deref().unwrap_or("unknown"),
                "request authorized"
            ),
            Err(err) => warn!(
                required,
                code = err.code(),
                status = err.status().as_u16(),
                error = ?err,
                "request rejected"
            ),
        }
        result
    }

    async fn run(&self, required: &str, authorization: Option<&str>) -> AuthResult<Claims> {
        let token = bearer_token(authorization)?;
        let kid = key_id(token)?;
        let key = self.keys.resolve(&kid).await?;
        let claims = self.verifier.verify(token, &key)?;
        check_permission(required, &claims)?;
        Ok(claims)
    }
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("issuer", &self.config.issuer())
            .field("audience", &self.config.audience)
            .field("jwks_url", &self.keys.fetcher().url())
            .finish()
    }
}
