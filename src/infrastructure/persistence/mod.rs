mod pg_credit_ledger;
mod pg_pool;
mod pg_recipe_repository;

pub use pg_credit_ledger::PgCreditLedger;
pub use pg_pool::create_pool;
pub use pg_recipe_repository::PgRecipeRepository;
