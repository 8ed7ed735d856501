use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::domain::UserId;

/// Audience the upstream auth provider stamps into every user token.
const TOKEN_AUDIENCE: &str = "authenticated";

/// Verifies bearer JWTs (HS256) and exposes the subject as `AuthUser`.
#[derive(Clone)]
pub struct JwtVerifier {
    secret: Option<Arc<String>>,
}

/// The authenticated caller, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
}

#[derive(Deserialize)]
struct Claims {
    sub: String,
}

impl JwtVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.map(Arc::new),
        }
    }

    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let secret = self.secret.as_ref().ok_or(AuthError::NotConfigured)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid(e.to_string()),
        })?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::Invalid("missing subject".to_string()));
        }

        Ok(UserId::new(data.claims.sub))
    }
}

enum AuthError {
    Missing,
    NotConfigured,
    Expired,
    Invalid(String),
}

impl AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::Missing => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            AuthError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server authentication not configured".to_string(),
            ),
            AuthError::Expired => (StatusCode::UNAUTHORIZED, "Token has expired".to_string()),
            AuthError::Invalid(reason) => {
                (StatusCode::UNAUTHORIZED, format!("Invalid token: {}", reason))
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub async fn auth_middleware(
    State(verifier): State<JwtVerifier>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return AuthError::Missing.into_response();
    };

    match verifier.verify(token) {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthUser { user_id });
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
