use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Verified token claims, produced once per successful verification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    pub subject: Option<String>,
    /// `None` when the token carries no `permissions` claim at all.
    pub permissions: Option<Vec<String>>,
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
    pub issuer: String,
    pub audience: Vec<String>,
    /// The complete decoded claim mapping.
    pub raw: serde_json::Value,
}

impl Claims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_some_and(|granted| granted.iter().any(|value| value == permission))
    }

    /// Looks up any claim by name, including application-specific ones.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.raw.get(name)
    }
}

#[derive(Debug, Deserialize)]
struct ClaimsRepr {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    permissions: Option<Vec<String>>,
    exp: i64,
    #[serde(default)]
    iat: Option<i64>,
    iss: String,
    #[serde(default)]
    aud: Option<AudienceRepr>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AudienceRepr {
    Single(String),
    Many(Vec<String>),
}

fn timestamp(name: &'static str, value: i64) -> AuthResult<DateTime<Utc>> {
    Utc.timestamp_opt(value, 0)
        .single()
        .ok_or_else(|| AuthError::MalformedToken(format!("invalid '{name}' claim: {value}")))
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        let expires_at = timestamp("exp", value.exp)?;
        let issued_at = value.iat.map(|iat| timestamp("iat", iat)).transpose()?;

        let audience = match value.aud {
            Some(AudienceRepr::Single(item)) => vec![item],
            Some(AudienceRepr::Many(items)) => items,
            None => Vec::new(),
        };

        Ok(Self {
            subject: value.sub,
            permissions: value.permissions,
            expires_at,
            issued_at,
            issuer: value.iss,
            audience,
            raw: serde_json::Value::Null,
        })
    }
}

impl TryFrom<serde_json::Value> for Claims {
    type Error = AuthError;

    fn try_from(value: serde_json::Value) -> AuthResult<Self> {
        let repr: ClaimsRepr = serde_json::from_value(value.clone())
            .map_err(|err| AuthError::MalformedToken(format!("malformed claim payload: {err}")))?;
        let mut claims = Claims::try_from(repr)?;
        claims.raw = value;
        Ok(claims)
    }
}
