use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use classbook_auth::{Claims, verify_token};
use classbook_core::AppError;

use crate::state::AppState;

pub const FORBIDDEN_MESSAGE: &str = "Authentication credentials were not provided or are invalid.";

/// Extractor that validates the bearer token. Handlers take it as their first
/// argument so that unauthenticated requests are turned away before the path,
/// query or body is looked at.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| AppError::forbidden(FORBIDDEN_MESSAGE))?;
        let claims = verify_token(token, &state.jwt_config)
            .map_err(|_| AppError::forbidden(FORBIDDEN_MESSAGE))?;

        Ok(AuthUser(claims))
    }
}
