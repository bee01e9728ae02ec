use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use std::sync::Arc;

use crate::notifications::models::{CheckSubscriptionResponse, EndpointRequest, SubscribeRequest};
use crate::notifications::service::{self, NotificationError};
use crate::web::models::SuccessResponse;
use crate::web::{AppError, AppState};

pub fn create_push_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/check", post(check_subscription))
        .route("/unsubscribe", post(unsubscribe))
        .route("/vapid-public-key", get(vapid_public_key))
}

#[derive(Serialize)]
struct SubscribeResponse {
    success: bool,
    id: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VapidPublicKeyResponse {
    public_key: String,
}

async fn subscribe(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<SubscribeRequest>, AppError>,
) -> Result<Json<SubscribeResponse>, AppError> {
    let stored = service::subscribe(&app_state.db_pool, payload).await?;
    Ok(Json(SubscribeResponse {
        success: true,
        id: stored.id,
    }))
}

async fn check_subscription(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<EndpointRequest>, AppError>,
) -> Result<Json<CheckSubscriptionResponse>, AppError> {
    let subscribed = service::is_subscribed(&app_state.db_pool, payload.endpoint.as_deref()).await?;
    Ok(Json(CheckSubscriptionResponse { subscribed }))
}

async fn unsubscribe(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<EndpointRequest>, AppError>,
) -> Result<Json<SuccessResponse>, AppError> {
    service::unsubscribe(&app_state.db_pool, payload.endpoint.as_deref()).await?;
    Ok(Json(SuccessResponse::ok()))
}

async fn vapid_public_key(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<VapidPublicKeyResponse>, AppError> {
    let credentials = app_state
        .config
        .vapid_credentials()
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or(NotificationError::MissingVapidKeys)?;

    Ok(Json(VapidPublicKeyResponse {
        public_key: credentials.public_key().to_string(),
    }))
}
