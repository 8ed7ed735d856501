mod pricing;
mod recipe;
mod user;

pub use pricing::{
    find_package, PricingPackage, DEFAULT_NEW_USER_CREDITS, PRICING_PACKAGES,
    RECIPE_GENERATION_COST,
};
pub use recipe::{
    Recipe, RecipeDraft, RecipeId, DEFAULT_AUTHOR, DEFAULT_COOK_TIME, DEFAULT_PREP_TIME,
    DEFAULT_YIELD,
};
pub use user::UserId;
