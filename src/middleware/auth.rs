use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{dto::auth::Claims, error::AppError, state::AppState};

pub const ADMIN_ROLE: &str = "admin";

/// Authenticated back-office user. Extraction fails unless the bearer token
/// is valid and carries the `admin` role.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: i64,
    pub role: String,
}

pub fn ensure_role(role: &str, required: &str) -> Result<(), AppError> {
    if role != required {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::BadRequest("Invalid Authorization scheme".into()))?
            .trim();

        let claims = decode_claims(token, &state.config.jwt_secret)?;
        ensure_role(&claims.role, ADMIN_ROLE)?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;

        Ok(AdminUser {
            user_id,
            role: claims.role,
        })
    }
}
