/*
 * Responsibility
 * - URL 構造を定義 (唯一の登録箇所)
 * - public / protected の 2 区分をここで明示する
 *   - public: guard なし
 *   - protected: require(permission, ...) で包む。必要な permission はここで一目で分かる
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::handlers::{
    drinks::{create_drink, delete_drink, list_drinks, list_drinks_detail, update_drink},
    health::health,
};
use crate::middleware::auth::require;
use crate::state::AppState;

/// Permission strings as issued by the identity provider.
pub mod permissions {
    pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
    pub const POST_DRINKS: &str = "post:drinks";
    pub const PATCH_DRINKS: &str = "patch:drinks";
    pub const DELETE_DRINKS: &str = "delete:drinks";
}

pub fn routes(state: &AppState) -> Router<AppState> {
    let auth = &state.auth;

    Router::new()
        // public
        .route("/health", get(health))
        // public GET + protected POST on the same path
        .route(
            "/drinks",
            get(list_drinks).merge(require(
                auth.clone(),
                permissions::POST_DRINKS,
                post(create_drink),
            )),
        )
        // protected
        .route(
            "/drinks-detail",
            require(
                auth.clone(),
                permissions::GET_DRINKS_DETAIL,
                get(list_drinks_detail),
            ),
        )
        .route(
            "/drinks/{drink_id}",
            require(auth.clone(), permissions::PATCH_DRINKS, patch(update_drink)).merge(
                require(auth.clone(), permissions::DELETE_DRINKS, delete(delete_drink)),
            ),
        )
}
