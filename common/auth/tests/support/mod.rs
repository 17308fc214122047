#![allow(dead_code)]

use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use casting_auth::{AuthConfig, Authorizer};
use chrono::Utc;
use httpmock::prelude::*;
use httpmock::Mock;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};

pub const DOMAIN: &str = "casting-agency.test";
pub const AUDIENCE: &str = "casting";
pub const KID: &str = "casting-key";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

pub struct KeyMaterial {
    pub encoding: EncodingKey,
    pub modulus: String,
    pub exponent: String,
}

fn generate_key_material() -> KeyMaterial {
    let mut rng = OsRng;
    let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("key generation");
    let public_key = private_key.to_public_key();
    let private_pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .expect("private pem");

    KeyMaterial {
        encoding: EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("encoding key"),
        modulus: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
        exponent: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
    }
}

pub fn primary_key() -> &'static KeyMaterial {
    static KEY: OnceLock<KeyMaterial> = OnceLock::new();
    KEY.get_or_init(generate_key_material)
}

pub fn rotated_key() -> &'static KeyMaterial {
    static KEY: OnceLock<KeyMaterial> = OnceLock::new();
    KEY.get_or_init(generate_key_material)
}

pub fn jwk(kid: &str, material: &KeyMaterial) -> Value {
    json!({
        "kty": "RSA",
        "kid": kid,
        "use": "sig",
        "alg": "RS256",
        "n": material.modulus,
        "e": material.exponent
    })
}

pub async fn serve_jwks(server: &MockServer, keys: Vec<Value>) -> Mock<'_> {
    let body = json!({ "keys": keys }).to_string();
    server
        .mock_async(|when, then| {
            when.method(GET).path(JWKS_PATH);
            then.status(200)
                .header("content-type", "application/json")
                .body(body);
        })
        .await
}

pub fn config(server: &MockServer) -> AuthConfig {
    AuthConfig::new(DOMAIN, AUDIENCE).with_jwks_url(server.url(JWKS_PATH))
}

pub fn authorizer(server: &MockServer) -> Authorizer {
    Authorizer::new(config(server)).expect("authorizer")
}

/// Claims an Auth0 access token for this API would carry.
pub fn claims(permissions: &[&str]) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": format!("https://{DOMAIN}/"),
        "sub": "auth0|casting-user",
        "aud": [AUDIENCE, format!("https://{DOMAIN}/userinfo")],
        "iat": now,
        "exp": now + 600,
        "azp": "casting-client",
        "scope": "openid profile email",
        "permissions": permissions
    })
}

pub fn sign(material: &KeyMaterial, kid: Option<&str>, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    encode(&header, claims, &material.encoding).expect("sign token")
}

pub fn token(permissions: &[&str]) -> String {
    sign(primary_key(), Some(KID), &claims(permissions))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
