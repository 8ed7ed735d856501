use std::env;

use crate::domain::{DEFAULT_NEW_USER_CREDITS, RECIPE_GENERATION_COST};

use super::Environment;

#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub google_speech_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub jwt_secret: Option<String>,
    pub stripe: StripeSettings,
    pub razorpay: RazorpaySettings,
    pub rate_limit: RateLimitSettings,
    pub credits: CreditSettings,
}

#[derive(Debug, Clone)]
pub struct StripeSettings {
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RazorpaySettings {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub window_secs: u64,
    pub max_requests: usize,
}

#[derive(Debug, Clone)]
pub struct CreditSettings {
    pub recipe_cost: i64,
    pub default_new_user_credits: i64,
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> Self {
        let environment = env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .unwrap_or(Environment::Local);

        Self {
            environment,
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_opt("SERVER_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: env_opt("DATABASE_URL"),
            google_speech_api_key: env_opt("GOOGLE_SPEECH_API_KEY"),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_model: env_opt("GEMINI_MODEL")
                .unwrap_or_else(|| "gemini-2.5-flash".to_string()),
            jwt_secret: env_opt("JWT_SECRET"),
            stripe: StripeSettings {
                public_key: env_opt("STRIPE_PUBLIC_KEY"),
                secret_key: env_opt("STRIPE_SECRET_KEY"),
            },
            razorpay: RazorpaySettings {
                key_id: env_opt("RAZORPAY_KEY_ID"),
                key_secret: env_opt("RAZORPAY_KEY_SECRET"),
            },
            rate_limit: RateLimitSettings {
                window_secs: env_opt("RATE_LIMIT_WINDOW_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
                max_requests: env_opt("RATE_LIMIT_MAX_REQUESTS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
            credits: CreditSettings {
                recipe_cost: RECIPE_GENERATION_COST,
                default_new_user_credits: DEFAULT_NEW_USER_CREDITS,
            },
        }
    }
}
