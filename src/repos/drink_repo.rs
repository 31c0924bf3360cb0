/*
 * Responsibility
 * - drinks テーブル向け SQLx 操作 (insert / update / delete / query)
 * - recipe は JSONB に Ingredient の配列として保存
 * - title の UNIQUE 違反は RepoError::Conflict へ
 *
 * Table: drinks(id BIGSERIAL PRIMARY KEY, title TEXT UNIQUE NOT NULL, recipe JSONB NOT NULL)
 */
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, types::Json};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i64,
    pub title: String,
    pub recipe: Json<Vec<Ingredient>>,
}

pub async fn list(db: &PgPool) -> Result<Vec<DrinkRow>, RepoError> {
    let rows = sqlx::query_as::<_, DrinkRow>(
        r#"
        SELECT id, title, recipe
        FROM drinks
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn create(
    db: &PgPool,
    title: &str,
    recipe: &[Ingredient],
) -> Result<DrinkRow, RepoError> {
    let row = sqlx::query_as::<_, DrinkRow>(
        r#"
        INSERT INTO drinks (title, recipe)
        VALUES ($1, $2)
        RETURNING id, title, recipe
        "#,
    )
    .bind(title)
    .bind(Json(recipe))
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    drink_id: i64,
    title: Option<&str>,
    recipe: Option<&[Ingredient]>,
) -> Result<Option<DrinkRow>, RepoError> {
    // None for either field keeps the stored value
    let row = sqlx::query_as::<_, DrinkRow>(
        r#"
        UPDATE drinks
        SET
            title = COALESCE($2, title),
            recipe = COALESCE($3, recipe)
        WHERE id = $1
        RETURNING id, title, recipe
        "#,
    )
    .bind(drink_id)
    .bind(title)
    .bind(recipe.map(Json))
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, drink_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM drinks
        WHERE id = $1
        "#,
    )
    .bind(drink_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
