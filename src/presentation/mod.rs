pub mod auth;
pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use auth::{AuthUser, JwtVerifier};
pub use config::{Environment, Settings};
pub use router::create_router;
pub use state::{AppState, PaymentGateways};
