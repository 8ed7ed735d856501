use async_trait::async_trait;

use crate::domain::{Recipe, RecipeId, UserId};

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeUpdate {
    pub recipe_name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub yield_: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub tips: Option<Vec<String>>,
}

/// Per-user recipe CRUD. Every read and mutation is scoped to the owner;
/// a missing or foreign row is indistinguishable from not-found.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn create(&self, recipe: &Recipe) -> Result<(), RepositoryError>;

    async fn list(&self, user: &UserId, search: Option<&str>)
        -> Result<Vec<Recipe>, RepositoryError>;

    async fn get(&self, user: &UserId, id: RecipeId) -> Result<Option<Recipe>, RepositoryError>;

    async fn update(
        &self,
        user: &UserId,
        id: RecipeId,
        update: &RecipeUpdate,
    ) -> Result<Option<Recipe>, RepositoryError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, user: &UserId, id: RecipeId) -> Result<bool, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
}
