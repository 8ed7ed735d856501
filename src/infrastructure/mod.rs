pub mod audio;
pub mod llm;
pub mod observability;
pub mod payments;
pub mod persistence;
pub mod rate_limit;
pub mod speech;
