use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::DecodedClaims;

/// Handler で、検証済み claims を受け取るための extractor
///
/// `middleware::auth::require` が request.extensions() に insert 済みである前提。
/// 見つからない場合は guard を通さずに route を登録した配線ミス。
pub struct AuthClaims(pub DecodedClaims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // take, not clone: the claims are handed over to exactly one handler
        parts
            .extensions
            .remove::<DecodedClaims>()
            .map(AuthClaims)
            .ok_or_else(|| {
                tracing::error!(uri = %parts.uri, "claims requested on a route without a guard");
                AppError::Internal
            })
    }
}
