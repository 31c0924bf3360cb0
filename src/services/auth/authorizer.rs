use std::sync::Arc;

use axum::http::HeaderMap;
use jsonwebtoken::{DecodingKey, Validation, errors::ErrorKind, jwk::Jwk};
use serde_json::{Map, Value};

use crate::config::AuthSettings;
use crate::services::auth::{
    bearer::extract_token,
    claims::{DecodedClaims, check_permission},
    error::AuthError,
    jwks::{KeySource, signing_key},
    key_cache::KeyCache,
};

/// Verifies bearer tokens issued by the configured identity provider.
///
/// - signature against the provider's published RSA keys (selected by `kid`)
/// - only the configured algorithms are accepted
/// - `iss` must be `https://<domain>/`, `aud` the configured audience
/// - the token is expired once the current time reaches `exp`
pub struct Authorizer {
    keys: KeyCache,
    validation: Validation,
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("keys", &self.keys)
            .field("algorithms", &self.validation.algorithms)
            .field("iss", &self.validation.iss)
            .field("aud", &self.validation.aud)
            .finish()
    }
}

impl Authorizer {
    pub fn new(settings: &AuthSettings, source: Arc<dyn KeySource>) -> Self {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::RS256);
        // An empty list makes every decode fail with MissingAlgorithm.
        validation.algorithms = settings.algorithms.clone();
        validation.set_issuer(&[settings.issuer()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = settings.leeway_seconds;
        // jsonwebtoken alone accepts `exp == now`; this makes the expiry
        // second itself count as expired. Expiry is checked before iss/aud.
        validation.reject_tokens_expiring_in_less_than = 1;

        Self {
            keys: KeyCache::new(
                source,
                settings.jwks_cache_ttl,
                settings.jwks_min_refresh,
            ),
            validation,
        }
    }

    /// Extract, verify and check `permission` in one go.
    ///
    /// Steps run in order and stop at the first failure.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        permission: &str,
    ) -> Result<DecodedClaims, AuthError> {
        let token = extract_token(headers)?;
        let claims = self.verify(token).await?;
        check_permission(&claims, permission)?;
        Ok(claims)
    }

    /// Verify signature and standard claims of a raw token.
    pub async fn verify(&self, token: &str) -> Result<DecodedClaims, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(|_| AuthError::Malformed)?;
        let kid = header.kid.as_deref().ok_or(AuthError::Malformed)?;

        let jwk = self.resolve_key(kid).await?;
        let key = DecodingKey::from_jwk(&jwk).map_err(AuthError::Unverifiable)?;

        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &key, &self.validation)
            .map_err(classify)?;

        Ok(DecodedClaims::new(data.claims))
    }

    /// Find `kid` in the key set, refetching once if it is not there.
    ///
    /// The refetch is skipped when the set was fetched by this very call, or
    /// when another forced refetch ran recently.
    async fn resolve_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let keys = self.keys.get().await.map_err(AuthError::KeysUnavailable)?;

        if let Some(jwk) = signing_key(&keys.set, kid) {
            return Ok(jwk.clone());
        }
        if keys.fetched_now {
            return Err(AuthError::UnknownKey);
        }

        let Some(set) = self
            .keys
            .force_refresh()
            .await
            .map_err(AuthError::KeysUnavailable)?
        else {
            tracing::debug!(kid, "unknown kid, key refresh throttled");
            return Err(AuthError::UnknownKey);
        };

        tracing::debug!(kid, "unknown kid, signing keys refreshed");

        signing_key(&set, kid).cloned().ok_or(AuthError::UnknownKey)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::IncorrectClaims,
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
            AuthError::IncorrectClaims
        }
        _ => AuthError::Unverifiable(err),
    }
}
