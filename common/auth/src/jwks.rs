use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{AuthError, AuthResult};

/// The issuer's published key set as served from `/.well-known/jwks.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeySet {
    pub keys: Vec<JwkRecord>,
}

/// One entry of a key set. Providers are not trusted to fill every field.
#[derive(Debug, Clone, Deserialize)]
pub struct JwkRecord {
    pub kid: Option<String>,
    pub kty: Option<String>,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    pub alg: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
}

/// RSA public key parameters resolved for a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKey {
    pub kty: String,
    pub kid: String,
    pub key_use: Option<String>,
    pub n: String,
    pub e: String,
}

impl SigningKey {
    pub fn decoding_key(&self) -> AuthResult<DecodingKey> {
        DecodingKey::from_rsa_components(&self.n, &self.e).map_err(|err| {
            AuthError::JwksUnavailable(format!(
                "failed to parse decoding key for kid '{}': {err}",
                self.kid
            ))
        })
    }
}

impl KeySet {
    /// Finds the key published under `kid`.
    ///
    /// Every entry is scanned; when a provider publishes the same kid twice the
    /// last entry wins.
    pub fn find(&self, kid: &str) -> AuthResult<SigningKey> {
        let record = self
            .keys
            .iter()
            .filter(|key| key.kid.as_deref() == Some(kid))
            .last()
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))?;

        let kty = record.kty.clone().unwrap_or_else(|| "RSA".to_string());
        if kty != "RSA" {
            return Err(AuthError::JwksUnavailable(format!(
                "JWKS key '{kid}' uses unsupported key type '{kty}'"
            )));
        }

        let missing = || {
            AuthError::JwksUnavailable(format!(
                "JWKS key '{kid}' missing required RSA components"
            ))
        };
        let n = record.n.clone().ok_or_else(missing)?;
        let e = record.e.clone().ok_or_else(missing)?;

        Ok(SigningKey {
            kty,
            kid: kid.to_string(),
            key_use: record.key_use.clone(),
            n,
            e,
        })
    }
}

#[derive(Clone)]
pub struct JwksFetcher {
    client: Client,
    url: String,
}

impl JwksFetcher {
    /// Fetcher whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AuthError::JwksUnavailable(err.to_string()))?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> AuthResult<KeySet> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| AuthError::JwksUnavailable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::JwksUnavailable(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        response.json::<KeySet>().await.map_err(|err| {
            AuthError::JwksUnavailable(format!("failed to parse JWKS response: {err}"))
        })
    }
}

struct CachedKeySet {
    keys: Arc<KeySet>,
    fetched_at: Instant,
}

/// Key set source shared by every authorization check.
///
/// With a zero TTL each call goes to the network. Otherwise a fetched set is
/// reused until it is `ttl` old; the refetch happens under the write lock so
/// concurrent callers wait for a single request.
#[derive(Clone)]
pub struct JwksCache {
    fetcher: JwksFetcher,
    ttl: Duration,
    entry: Arc<RwLock<Option<CachedKeySet>>>,
}

impl JwksCache {
    pub fn new(fetcher: JwksFetcher, ttl: Duration) -> Self {
        if !ttl.is_zero() {
            info!(jwks_url = %fetcher.url(), ttl_secs = ttl.as_secs(), "Caching JWKS keys");
        }
        Self {
            fetcher,
            ttl,
            entry: Arc::new(RwLock::new(None)),
        }
    }

    pub fn fetcher(&self) -> &JwksFetcher {
        &self.fetcher
    }

    pub async fn key_set(&self) -> AuthResult<Arc<KeySet>> {
        if self.ttl.is_zero() {
            return self.fetcher.fetch().await.map(Arc::new);
        }

        {
            let guard = self.entry.read().await;
            if let Some(keys) = self.fresh(&guard) {
                return Ok(keys);
            }
        }

        let mut guard = self.entry.write().await;
        if let Some(keys) = self.fresh(&guard) {
            return Ok(keys);
        }

        let keys = Arc::new(self.fetcher.fetch().await?);
        debug!(count = keys.keys.len(), jwks_url = %self.fetcher.url(), "Refreshed JWKS keys");
        *guard = Some(CachedKeySet {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }

    pub async fn resolve(&self, kid: &str) -> AuthResult<SigningKey> {
        self.key_set().await?.find(kid)
    }

    /// Drops any cached set so the next call fetches again.
    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }

    fn fresh(&self, entry: &Option<CachedKeySet>) -> Option<Arc<KeySet>> {
        entry
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.keys.clone())
    }
}
