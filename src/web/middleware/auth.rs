use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use std::sync::Arc;
use tracing::warn;

use crate::web::models::{AuthenticatedAdmin, Claims};
use crate::web::{AppState, TOKEN_COOKIE, error::AppError};

/// The admin token from `Authorization: Bearer`, else from the session cookie.
fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .or_else(|| jar.get(TOKEN_COOKIE).map(|cookie| cookie.value().to_string()))
}

/// Guards the admin routes: rejects the request unless it carries a valid admin JWT.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(req.headers(), &jar).ok_or(AppError::InvalidCredentials)?;

    let claims = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!(error = %e, "Rejected admin token.");
        AppError::InvalidCredentials
    })?
    .claims;

    req.extensions_mut().insert(AuthenticatedAdmin {
        subject: claims.sub,
    });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "from-cookie"));

        assert_eq!(session_token(&headers, &jar).as_deref(), Some("from-header"));
    }

    #[test]
    fn cookie_is_used_without_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "from-cookie"));

        assert_eq!(session_token(&headers, &jar).as_deref(), Some("from-cookie"));
        assert_eq!(session_token(&HeaderMap::new(), &CookieJar::new()), None);
    }
}
