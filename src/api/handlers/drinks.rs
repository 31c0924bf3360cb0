/*
 * Responsibility
 * - /drinks 系 CRUD handler
 * - guard 済みルートは AuthClaims を受け取る (未認可ならここまで到達しない)
 * - Path/Json の rejection も AppError の envelope に揃える
 */
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::{
    api::{
        dto::drinks::{
            CreateDrinkRequest, DeleteResponse, DrinkLong, DrinkShort, DrinksResponse,
            UpdateDrinkRequest,
        },
        extractors::AuthClaims,
    },
    error::AppError,
    repos::drink_repo,
    state::AppState,
};

/// GET /drinks (public). An empty table is an empty list, not a 404.
pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkShort>>, AppError> {
    let rows = drink_repo::list(&state.db).await?;
    Ok(Json(DrinksResponse::new(
        rows.into_iter().map(DrinkShort::from).collect(),
    )))
}

pub async fn list_drinks_detail(
    State(state): State<AppState>,
    AuthClaims(_claims): AuthClaims,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let rows = drink_repo::list(&state.db).await?;
    Ok(Json(DrinksResponse::new(
        rows.into_iter().map(DrinkLong::from).collect(),
    )))
}

pub async fn create_drink(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let Json(req) = payload?;
    req.validate().map_err(|reason| {
        tracing::debug!(reason, "invalid drink");
        AppError::Unprocessable
    })?;

    let recipe = req.recipe.into_vec();
    let row = drink_repo::create(&state.db, req.title.trim(), &recipe).await?;

    tracing::info!(drink_id = row.id, sub = claims.sub(), "drink created");

    Ok(Json(DrinksResponse::new(vec![DrinkLong::from(row)])))
}

pub async fn update_drink(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    drink_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let Path(drink_id) = drink_id?;
    let Json(req) = payload?;
    req.validate().map_err(|reason| {
        tracing::debug!(reason, "invalid drink update");
        AppError::Unprocessable
    })?;

    let recipe = req.recipe.map(|r| r.into_vec());
    let row = drink_repo::update(
        &state.db,
        drink_id,
        req.title.as_deref().map(str::trim),
        recipe.as_deref(),
    )
    .await?
    .ok_or(AppError::NotFound)?;

    tracing::info!(drink_id, sub = claims.sub(), "drink updated");

    Ok(Json(DrinksResponse::new(vec![DrinkLong::from(row)])))
}

pub async fn delete_drink(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    drink_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let Path(drink_id) = drink_id?;

    if !drink_repo::delete(&state.db, drink_id).await? {
        return Err(AppError::NotFound);
    }

    tracing::info!(drink_id, sub = claims.sub(), "drink deleted");

    Ok(Json(DeleteResponse {
        success: true,
        delete: drink_id,
    }))
}
