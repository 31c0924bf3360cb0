//! JSON Web Key Set retrieval.
//!
//! `KeySource` is the seam between the verifier and the network: production
//! uses `HttpKeySource` against `https://<domain>/.well-known/jwks.json`,
//! tests plug in an in-memory set.
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, PublicKeyUse};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("invalid jwks url: {0}")]
    Url(#[from] url::ParseError),
    #[error("jwks request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("jwks endpoint returned HTTP {0}")]
    Status(u16),
}

/// RSA signing key published under `kid`.
///
/// Encryption keys (`use: enc`) and non-RSA keys never verify a signature
/// here, so they are treated as absent.
pub fn signing_key<'a>(set: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    set.keys.iter().find(|jwk| {
        jwk.common.key_id.as_deref() == Some(kid)
            && matches!(
                jwk.common.public_key_use,
                None | Some(PublicKeyUse::Signature)
            )
            && matches!(jwk.algorithm, AlgorithmParameters::RSA(_))
    })
}

#[async_trait]
pub trait KeySource: Send + Sync + 'static {
    /// Where the keys come from (for logging).
    fn location(&self) -> &str;

    async fn fetch(&self) -> Result<JwkSet, KeySetError>;
}

/// Fetches the key set over HTTPS with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpKeySource {
    url: Url,
    client: reqwest::Client,
}

impl HttpKeySource {
    pub fn new(domain: &str, timeout: Duration) -> Result<Self, KeySetError> {
        let url = jwks_url(domain)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self { url, client })
    }
}

pub fn jwks_url(domain: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("https://{}/", domain))?.join(".well-known/jwks.json")
}

#[async_trait]
impl KeySource for HttpKeySource {
    fn location(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeySetError::Status(status.as_u16()));
        }

        Ok(response.json::<JwkSet>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_points_at_well_known_path() {
        let url = jwks_url("tenant.us.auth0.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://tenant.us.auth0.com/.well-known/jwks.json"
        );
    }

    #[test]
    fn only_rsa_signing_keys_are_candidates() {
        let body = r#"{
            "keys": [
                {"kty": "RSA", "use": "sig", "kid": "a", "n": "qqq", "e": "AQAB",
                 "x5t": "zzz", "x5c": ["MIIC"]},
                {"kty": "RSA", "use": "enc", "kid": "b", "n": "rrr", "e": "AQAB"},
                {"kty": "EC", "kid": "c", "crv": "P-256", "x": "MQ", "y": "Mg"},
                {"kty": "RSA", "kid": "d", "n": "sss", "e": "AQAB"}
            ]
        }"#;

        let set: JwkSet = serde_json::from_str(body).unwrap();
        assert_eq!(set.keys.len(), 4);

        let a = signing_key(&set, "a").unwrap();
        assert_eq!(a.common.key_id.as_deref(), Some("a"));

        // encryption keys are not candidates for signature checks
        assert!(signing_key(&set, "b").is_none());
        assert!(signing_key(&set, "c").is_none());
        // `use` is optional
        assert!(signing_key(&set, "d").is_some());
        assert!(signing_key(&set, "missing").is_none());
    }
}
