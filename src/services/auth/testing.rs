//! Test fixtures: RSA keys, an in-memory key source and token minting.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use crate::config::AuthSettings;
use crate::services::auth::Authorizer;
use crate::services::auth::jwks::{KeySetError, KeySource};

pub const PRIMARY_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/primary.pem"
));
/// Not published in the fixture key set.
pub const ROGUE_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/rogue.pem"
));
const JWKS_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/jwks.json"
));

pub const KID: &str = "test-key-1";
pub const DOMAIN: &str = "test-tenant.us.auth0.com";
pub const ISSUER: &str = "https://test-tenant.us.auth0.com/";
pub const AUDIENCE: &str = "drink";

pub fn fixture_jwks() -> JwkSet {
    serde_json::from_str(JWKS_JSON).expect("fixture jwks")
}

pub fn empty_jwks() -> JwkSet {
    JwkSet { keys: Vec::new() }
}

pub fn settings() -> AuthSettings {
    AuthSettings {
        domain: DOMAIN.to_string(),
        audience: AUDIENCE.to_string(),
        algorithms: vec![Algorithm::RS256],
        leeway_seconds: 0,
        jwks_cache_ttl: Duration::from_secs(60),
        jwks_timeout: Duration::from_secs(1),
        jwks_min_refresh: Duration::from_secs(30),
    }
}

pub fn authorizer(keys: JwkSet) -> (Authorizer, Arc<StaticKeySource>) {
    let source = Arc::new(StaticKeySource::new(keys));
    let auth = Authorizer::new(&settings(), source.clone());
    (auth, source)
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Claims that pass every check for the fixture settings.
pub fn valid_claims(permissions: &[&str]) -> Value {
    let now = now();
    json!({
        "iss": ISSUER,
        "sub": "auth0|barista",
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    })
}

/// RS256 token signed by the published fixture key.
pub fn sign(claims: &Value) -> String {
    sign_with(PRIMARY_PEM, Algorithm::RS256, Some(KID), claims)
}

pub fn sign_with(pem: &str, alg: Algorithm, kid: Option<&str>, claims: &Value) -> String {
    let mut header = Header::new(alg);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture pem");
    jsonwebtoken::encode(&header, claims, &key).expect("sign fixture token")
}

/// Serves a fixed (replaceable) key set and counts fetches.
pub struct StaticKeySource {
    keys: Mutex<JwkSet>,
    fetches: AtomicUsize,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self {
            keys: Mutex::new(keys),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn replace(&self, keys: JwkSet) {
        *self.keys.lock().unwrap() = keys;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    fn location(&self) -> &str {
        "memory"
    }

    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.keys.lock().unwrap().clone())
    }
}

pub struct FailingKeySource;

#[async_trait]
impl KeySource for FailingKeySource {
    fn location(&self) -> &str {
        "unreachable"
    }

    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        Err(KeySetError::Status(503))
    }
}
