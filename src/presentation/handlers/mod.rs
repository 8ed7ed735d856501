mod config;
mod credits;
mod health;
mod payments;
mod process_recipe;
mod recipes;

use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub use config::{payments_config_handler, pricing_handler};
pub use credits::get_credits_handler;
pub use health::health_handler;
pub use payments::{
    create_payment_intent_handler, create_razorpay_order_handler, simulate_purchase_handler,
    verify_payment_handler,
};
pub use process_recipe::process_recipe_handler;
pub use recipes::{
    create_recipe_handler, delete_recipe_handler, get_recipe_handler, list_recipes_handler,
    update_recipe_handler,
};
