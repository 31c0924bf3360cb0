use serde_json::{Map, Value};

use crate::services::auth::error::AuthError;

/// Claim set of a token that passed signature and `iss`/`aud`/`exp` checks.
///
/// Only the verifier constructs this.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClaims(Map<String, Value>);

impl DecodedClaims {
    pub(crate) fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn sub(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// String entries of the `permissions` claim, `None` when the claim is absent.
    pub fn permissions(&self) -> Option<Vec<&str>> {
        let value = self.get("permissions")?;
        Some(
            value
                .as_array()
                .map(|items| items.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default(),
        )
    }
}

/// Require `permission` to be listed in the token's `permissions` claim.
///
/// A missing claim and a claim without the entry fail differently: the first
/// is a token minted without permission scoping (400), the second a caller
/// lacking the grant (403).
pub fn check_permission(claims: &DecodedClaims, permission: &str) -> Result<(), AuthError> {
    let granted = claims.permissions().ok_or(AuthError::PermissionsMissing)?;

    if granted.contains(&permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> DecodedClaims {
        match value {
            Value::Object(map) => DecodedClaims::new(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn permission_present() {
        let c = claims(json!({"permissions": ["get:drinks-detail", "post:drinks"]}));
        assert!(check_permission(&c, "post:drinks").is_ok());
    }

    #[test]
    fn permissions_claim_absent() {
        let err = check_permission(&claims(json!({"sub": "u1"})), "post:drinks").unwrap_err();
        assert!(matches!(err, AuthError::PermissionsMissing));
        assert_eq!(err.status().as_u16(), 400);
        assert_eq!(err.code(), "invalid_claims");
    }

    #[test]
    fn empty_permissions_is_a_denial_not_a_missing_claim() {
        let err = check_permission(&claims(json!({"permissions": []})), "post:drinks").unwrap_err();
        assert!(matches!(err, AuthError::PermissionDenied));
        assert_eq!(err.status().as_u16(), 403);
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn match_is_exact() {
        let c = claims(json!({"permissions": ["post:drinks "]}));
        assert!(matches!(
            check_permission(&c, "post:drinks"),
            Err(AuthError::PermissionDenied)
        ));

        let c = claims(json!({"permissions": ["POST:DRINKS"]}));
        assert!(matches!(
            check_permission(&c, "post:drinks"),
            Err(AuthError::PermissionDenied)
        ));
    }

    #[test]
    fn non_array_permissions_grant_nothing() {
        let c = claims(json!({"permissions": "post:drinks"}));
        assert!(matches!(
            check_permission(&c, "post:drinks"),
            Err(AuthError::PermissionDenied)
        ));
    }

    #[test]
    fn accessors() {
        let c = claims(json!({"sub": "auth0|123", "exp": 1_700_000_000}));
        assert_eq!(c.sub(), Some("auth0|123"));
        assert_eq!(c.get("exp"), Some(&json!(1_700_000_000)));
        assert_eq!(c.permissions(), None);
    }
}
