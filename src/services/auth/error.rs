//! Authorization failures.
//!
//! Every variant maps to a fixed `(status, code)` pair; the `Display` text is
//! the human description that ends up in the response envelope.

use axum::http::StatusCode;
use thiserror::Error;

use crate::services::auth::jwks::KeySetError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    HeaderMissing,
    #[error("Authorization header must start with \"Bearer\".")]
    NotBearer,
    #[error("Token not found.")]
    TokenMissing,
    #[error("Authorization header must be bearer token.")]
    TooManyParts,

    /// Token header could not be decoded, or carries no `kid`.
    #[error("Authorization malformed.")]
    Malformed,
    #[error("Unable to find the appropriate key.")]
    UnknownKey,
    #[error("Token expired.")]
    Expired,
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    IncorrectClaims,
    #[error("Unable to parse authentication token.")]
    Unverifiable(#[source] jsonwebtoken::errors::Error),

    #[error("Permissions not included in JWT.")]
    PermissionsMissing,
    #[error("Permission not found.")]
    PermissionDenied,

    #[error("Unable to fetch signing keys.")]
    KeysUnavailable(#[source] KeySetError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::HeaderMissing
            | Self::NotBearer
            | Self::TokenMissing
            | Self::TooManyParts
            | Self::Malformed
            | Self::Expired
            | Self::IncorrectClaims => StatusCode::UNAUTHORIZED,
            Self::UnknownKey | Self::Unverifiable(_) | Self::PermissionsMissing => {
                StatusCode::BAD_REQUEST
            }
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::KeysUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine readable code, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "authorization_header_missing",
            Self::NotBearer
            | Self::TokenMissing
            | Self::TooManyParts
            | Self::Malformed
            | Self::UnknownKey
            | Self::Unverifiable(_) => "invalid_header",
            Self::Expired => "token_expired",
            Self::IncorrectClaims | Self::PermissionsMissing => "invalid_claims",
            Self::PermissionDenied => "unauthorized",
            Self::KeysUnavailable(_) => "jwks_unavailable",
        }
    }
}
