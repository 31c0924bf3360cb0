use axum::http::{HeaderMap, header};

use crate::services::auth::error::AuthError;

const SCHEME: &str = "Bearer";

/// Pull the raw token out of `Authorization: Bearer <token>`.
///
/// The scheme is matched case-sensitively and the header must split into
/// exactly two whitespace separated parts.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::HeaderMissing)?;

    // Non-visible-ASCII values cannot carry the scheme literal.
    let value = value.to_str().map_err(|_| AuthError::NotBearer)?;

    let mut parts = value.split_whitespace();

    if parts.next() != Some(SCHEME) {
        return Err(AuthError::NotBearer);
    }

    let token = parts.next().ok_or(AuthError::TokenMissing)?;

    if parts.next().is_some() {
        return Err(AuthError::TooManyParts);
    }

    Ok(token)
}
