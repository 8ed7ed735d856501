use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Fallbacks applied when the extractor omits a required field.
pub const DEFAULT_AUTHOR: &str = "Home Chef";
pub const DEFAULT_PREP_TIME: &str = "15 minutes";
pub const DEFAULT_COOK_TIME: &str = "30 minutes";
pub const DEFAULT_YIELD: &str = "Serves 4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecipeId(Uuid);

impl RecipeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecipeId {
    fn default() -> Self {
        Self::new()
    }
}

/// The extracted recipe fields as produced by the generator, before
/// persistence. `yield` is a Rust keyword, hence the serde rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(default)]
    pub recipe_name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub cook_time: String,
    #[serde(rename = "yield", default)]
    pub yield_: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// A stored recipe row, owned by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: RecipeId,
    #[serde(skip_serializing)]
    pub user_id: UserId,
    pub recipe_name: String,
    pub author: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    #[serde(rename = "yield")]
    pub yield_: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub tips: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl serde::Serialize for RecipeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl Recipe {
    pub fn new(user_id: UserId, draft: RecipeDraft, transcription: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecipeId::new(),
            user_id,
            recipe_name: draft.recipe_name,
            author: draft.author,
            description: draft.description,
            prep_time: draft.prep_time,
            cook_time: draft.cook_time,
            yield_: draft.yield_,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            tips: draft.tips,
            transcription,
            created_at: now,
            updated_at: now,
        }
    }
}
