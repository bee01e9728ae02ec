use axum::Extension;
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use crate::server::config::ServerConfig;
use crate::web::error::AppError;
use crate::web::models::{AuthenticatedAdmin, Claims, LoginRequest, LoginResponse};

/// Subject of every admin token; there is a single shared password, not user accounts.
pub const ADMIN_SUBJECT: &str = "admin";

/// Checks the shared admin password and issues a session token.
pub fn login_admin(config: &ServerConfig, req: LoginRequest) -> Result<LoginResponse, AppError> {
    if req.password.is_empty() {
        return Err(AppError::InvalidInput("Password is required.".to_string()));
    }

    let password_hash = config
        .admin_password_hash
        .as_deref()
        .ok_or_else(|| AppError::Configuration("Admin password is not configured.".to_string()))?;

    let valid_password = verify(&req.password, password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_admin_jwt(&config.jwt_secret)
}

pub fn create_admin_jwt(jwt_secret: &str) -> Result<LoginResponse, AppError> {
    let expiration = (Utc::now() + Duration::days(7)).timestamp() as usize;

    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(LoginResponse { token })
}

pub async fn me(
    Extension(admin): Extension<AuthenticatedAdmin>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    Ok(axum::Json(serde_json::json!({
        "authenticated": true,
        "subject": admin.subject,
    })))
}
