use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::{
    WithRejection,
    cookie::{Cookie, CookieJar, SameSite},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::notifications::service::NotificationDispatcher;
use crate::server::config::ServerConfig;
use crate::services::auth_service;
use crate::web::{middleware::auth, models::LoginRequest, routes::*};

pub use crate::web::error::AppError;

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

/// Name of the http-only cookie carrying the admin JWT.
pub(crate) const TOKEN_COOKIE: &str = "token";

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub config: Arc<ServerConfig>,
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let login_response = auth_service::login_admin(&app_state.config, payload)?;

    let auth_cookie = Cookie::build((TOKEN_COOKIE, login_response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build();

    info!("Admin session started.");
    Ok((jar.add(auth_cookie), Json(login_response)))
}

async fn logout_handler(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(TOKEN_COOKIE).path("/")),
        Json(models::SuccessResponse::ok()),
    )
}

async fn health_check_handler() -> &'static str {
    "OK"
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    match config.cors_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => cors.allow_origin(AllowOrigin::exact(origin)),
        Some(Err(e)) => {
            warn!(error = %e, "Ignoring invalid CORS origin, allowing any origin.");
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}

pub fn create_axum_router(
    db_pool: DatabaseConnection,
    dispatcher: Arc<NotificationDispatcher>,
    config: Arc<ServerConfig>,
) -> Router {
    let cors = cors_layer(&config);

    let app_state = Arc::new(AppState {
        db_pool,
        dispatcher,
        config,
    });

    Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route(
            "/api/auth/me",
            get(auth_service::me)
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest("/api/notifications", notification_routes::create_notification_router())
        .nest("/api/push", push_routes::create_push_router())
        .nest("/api/picks", pick_routes::create_picks_router())
        .nest("/api/shopping", shopping_routes::create_shopping_router())
        .nest("/api/memories", memory_routes::create_memories_router())
        .nest(
            "/api/admin",
            admin_routes::create_admin_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
