use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{RecipeRepository, RecipeUpdate, RepositoryError};
use crate::domain::{Recipe, RecipeId, UserId};

pub struct PgRecipeRepository {
    pool: PgPool,
}

impl PgRecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RECIPE_COLUMNS: &str = r#"id, user_id, recipe_name, author, description, prep_time, cook_time, "yield", ingredients, instructions, tips, transcription, created_at, updated_at"#;

fn row_to_recipe(row: &sqlx::postgres::PgRow) -> Result<Recipe, RepositoryError> {
    let query_err = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());

    Ok(Recipe {
        id: RecipeId::from_uuid(row.try_get::<Uuid, _>("id").map_err(query_err)?),
        user_id: UserId::new(row.try_get::<String, _>("user_id").map_err(query_err)?),
        recipe_name: row.try_get("recipe_name").map_err(query_err)?,
        author: row.try_get("author").map_err(query_err)?,
        description: row.try_get("description").map_err(query_err)?,
        prep_time: row.try_get("prep_time").map_err(query_err)?,
        cook_time: row.try_get("cook_time").map_err(query_err)?,
        yield_: row.try_get("yield").map_err(query_err)?,
        ingredients: row
            .try_get::<Json<Vec<String>>, _>("ingredients")
            .map_err(query_err)?
            .0,
        instructions: row
            .try_get::<Json<Vec<String>>, _>("instructions")
            .map_err(query_err)?
            .0,
        tips: row.try_get::<Json<Vec<String>>, _>("tips").map_err(query_err)?.0,
        transcription: row.try_get("transcription").map_err(query_err)?,
        created_at: row.try_get("created_at").map_err(query_err)?,
        updated_at: row.try_get("updated_at").map_err(query_err)?,
    })
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    #[instrument(skip(self, recipe), fields(recipe_id = %recipe.id.as_uuid(), user_id = %recipe.user_id))]
    async fn create(&self, recipe: &Recipe) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO recipes
                (id, user_id, recipe_name, author, description, prep_time, cook_time, "yield",
                 ingredients, instructions, tips, transcription, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(recipe.id.as_uuid())
        .bind(recipe.user_id.as_str())
        .bind(&recipe.recipe_name)
        .bind(&recipe.author)
        .bind(&recipe.description)
        .bind(&recipe.prep_time)
        .bind(&recipe.cook_time)
        .bind(&recipe.yield_)
        .bind(Json(&recipe.ingredients))
        .bind(Json(&recipe.instructions))
        .bind(Json(&recipe.tips))
        .bind(&recipe.transcription)
        .bind(recipe.created_at)
        .bind(recipe.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user))]
    async fn list(
        &self,
        user: &UserId,
        search: Option<&str>,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
            FROM recipes
            WHERE user_id = $1
              AND ($2::text IS NULL
                   OR recipe_name ILIKE $2
                   OR author ILIKE $2
                   OR description ILIKE $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(user.as_str())
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(row_to_recipe).collect()
    }

    #[instrument(skip(self), fields(recipe_id = %id.as_uuid(), user_id = %user))]
    async fn get(&self, user: &UserId, id: RecipeId) -> Result<Option<Recipe>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_recipe).transpose()
    }

    #[instrument(skip(self, update), fields(recipe_id = %id.as_uuid(), user_id = %user))]
    async fn update(
        &self,
        user: &UserId,
        id: RecipeId,
        update: &RecipeUpdate,
    ) -> Result<Option<Recipe>, RepositoryError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE recipes SET
                recipe_name = COALESCE($3, recipe_name),
                author = COALESCE($4, author),
                description = COALESCE($5, description),
                prep_time = COALESCE($6, prep_time),
                cook_time = COALESCE($7, cook_time),
                "yield" = COALESCE($8, "yield"),
                ingredients = COALESCE($9, ingredients),
                instructions = COALESCE($10, instructions),
                tips = COALESCE($11, tips),
                updated_at = $12
            WHERE id = $1 AND user_id = $2
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(user.as_str())
        .bind(&update.recipe_name)
        .bind(&update.author)
        .bind(&update.description)
        .bind(&update.prep_time)
        .bind(&update.cook_time)
        .bind(&update.yield_)
        .bind(update.ingredients.as_ref().map(Json))
        .bind(update.instructions.as_ref().map(Json))
        .bind(update.tips.as_ref().map(Json))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_recipe).transpose()
    }

    #[instrument(skip(self), fields(recipe_id = %id.as_uuid(), user_id = %user))]
    async fn delete(&self, user: &UserId, id: RecipeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id.as_uuid())
            .bind(user.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
