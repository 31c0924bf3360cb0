/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON envelope)
 * - AuthError / RepoError / extractor rejection を統一的に変換
 *
 * Envelope: {"success": false, "error": <status>, "message": <text>}
 * 認可エラーのみ "code" を追加で返す (UI 側が分岐に使う)
 */
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request")]
    BadRequest,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("resource not found")]
    NotFound,
    #[error("invalid method")]
    MethodNotAllowed,
    #[error("unprocessable")]
    Unprocessable,
    #[error("request timeout")]
    Timeout,
    #[error("server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest => StatusCode::BAD_REQUEST,
            AppError::Auth(e) => e.status(),
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let code = match &self {
            AppError::Auth(e) => {
                tracing::warn!(
                    code = e.code(),
                    status = status.as_u16(),
                    error = ?e,
                    "authorization failed"
                );
                Some(e.code())
            }
            _ => None,
        };

        let body = ErrorResponse {
            success: false,
            error: status.as_u16(),
            message: self.to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::Unprocessable,
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        tracing::debug!(error = %e, "rejected request body");
        match e {
            // Well-formed JSON that does not fit the expected shape
            JsonRejection::JsonDataError(_) => AppError::Unprocessable,
            _ => AppError::BadRequest,
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        // `/drinks/abc` names no drink
        AppError::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn generic_errors_use_fixed_messages() {
        let cases = [
            (AppError::BadRequest, 400, "bad request"),
            (AppError::NotFound, 404, "resource not found"),
            (AppError::MethodNotAllowed, 405, "invalid method"),
            (AppError::Unprocessable, 422, "unprocessable"),
            (AppError::Timeout, 408, "request timeout"),
            (AppError::Internal, 500, "server error"),
        ];

        for (err, status, message) in cases {
            let (got_status, body) = render(err).await;
            assert_eq!(got_status.as_u16(), status);
            assert_eq!(
                body,
                json!({"success": false, "error": status, "message": message})
            );
        }
    }

    #[tokio::test]
    async fn auth_errors_carry_code_and_description() {
        let (status, body) = render(AuthError::PermissionDenied.into()).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": 403,
                "message": "Permission not found.",
                "code": "unauthorized",
            })
        );
    }

    #[tokio::test]
    async fn conflict_is_unprocessable() {
        let (status, _) = render(RepoError::Conflict.into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
