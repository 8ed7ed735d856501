mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    CreditSettings, RateLimitSettings, RazorpaySettings, Settings, StripeSettings,
};
