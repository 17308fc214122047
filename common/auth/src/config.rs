use std::env;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;

pub const ENV_DOMAIN: &str = "AUTH0_DOMAIN";
pub const ENV_AUDIENCE: &str = "API_AUDIENCE";
pub const ENV_ALGORITHMS: &str = "ALGORITHMS";
pub const ENV_LEEWAY: &str = "JWT_LEEWAY_SECONDS";
pub const ENV_JWKS_TIMEOUT: &str = "JWKS_TIMEOUT_SECONDS";
pub const ENV_JWKS_CACHE: &str = "JWKS_CACHE_SECONDS";
pub const ENV_JWKS_URL: &str = "JWKS_URL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration for bearer-token authorization.
///
/// Built once at startup and shared read-only by every authorization check.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Issuer host, e.g. `casting-agency.eu.auth0.com`.
    pub domain: String,
    /// Expected audience claim (aud).
    pub audience: String,
    /// Signature algorithms a token may declare.
    pub algorithms: Vec<Algorithm>,
    /// Allowable clock skew in seconds when validating exp/nbf.
    pub leeway_seconds: u32,
    /// Upper bound on a single JWKS request.
    pub jwks_timeout: Duration,
    /// How long a fetched key set may be reused. Zero fetches per request.
    pub jwks_cache_ttl: Duration,
    jwks_url: Option<String>,
}

impl AuthConfig {
    /// Construct config with defaults: RS256 only, no leeway, 5 second JWKS
    /// timeout and no key set caching.
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            leeway_seconds: 0,
            jwks_timeout: Duration::from_secs(5),
            jwks_cache_ttl: Duration::ZERO,
            jwks_url: None,
        }
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn with_jwks_timeout(mut self, timeout: Duration) -> Self {
        self.jwks_timeout = timeout;
        self
    }

    pub fn with_jwks_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_cache_ttl = ttl;
        self
    }

    /// Fetch keys from `url` instead of the issuer's well-known location.
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = Some(url.into());
        self
    }

    /// The `iss` value tokens must carry.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> String {
        match &self.jwks_url {
            Some(url) => url.clone(),
            None => format!("https://{}/.well-known/jwks.json", self.domain),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Blank values are treated as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let domain = get(ENV_DOMAIN).ok_or(ConfigError::Missing(ENV_DOMAIN))?;
        let audience = get(ENV_AUDIENCE).ok_or(ConfigError::Missing(ENV_AUDIENCE))?;
        let mut config = AuthConfig::new(normalize_domain(&domain), audience);

        if let Some(value) = get(ENV_ALGORITHMS) {
            config.algorithms = parse_algorithms(&value)?;
        }
        if let Some(value) = get(ENV_LEEWAY) {
            config.leeway_seconds = parse_number(ENV_LEEWAY, &value)?;
        }
        if let Some(value) = get(ENV_JWKS_TIMEOUT) {
            let seconds: u64 = parse_number(ENV_JWKS_TIMEOUT, &value)?;
            if seconds == 0 {
                return Err(ConfigError::Invalid {
                    key: ENV_JWKS_TIMEOUT,
                    value,
                });
            }
            config.jwks_timeout = Duration::from_secs(seconds);
        }
        if let Some(value) = get(ENV_JWKS_CACHE) {
            config.jwks_cache_ttl = Duration::from_secs(parse_number(ENV_JWKS_CACHE, &value)?);
        }
        config.jwks_url = get(ENV_JWKS_URL);

        Ok(config)
    }
}

/// Accepts `RS256`, `RS256,RS384`, `RS256 RS384` and the list literal form
/// `['RS256']`.
pub fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let algorithms = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|item| item.trim_matches(|c: char| matches!(c, '[' | ']' | '"' | '\'')))
        .filter(|item| !item.is_empty())
        .map(|item| {
            Algorithm::from_str(item).map_err(|_| ConfigError::Invalid {
                key: ENV_ALGORITHMS,
                value: item.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid {
            key: ENV_ALGORITHMS,
            value: value.to_string(),
        });
    }
    Ok(algorithms)
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn normalize_domain(value: &str) -> String {
    let value = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .unwrap_or(value);
    value.trim_end_matches('/').to_string()
}
