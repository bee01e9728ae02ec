use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{entities::notification, services};
use crate::notifications::models::{DispatchSummary, SendNotificationRequest};
use crate::web::models::SuccessResponse;
use crate::web::{AppError, AppState};

pub fn create_notification_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_notifications).delete(delete_notification))
        .route("/send", post(send_notification))
}

#[derive(Debug, Deserialize)]
pub struct DeleteNotificationQuery {
    id: Option<String>,
}

async fn send_notification(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<SendNotificationRequest>, AppError>,
) -> Result<Json<DispatchSummary>, AppError> {
    let summary = app_state.dispatcher.send_notification(payload).await?;
    Ok(Json(summary))
}

async fn list_notifications(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<notification::Model>>, AppError> {
    let notifications = services::get_recent_notifications(&app_state.db_pool).await?;
    Ok(Json(notifications))
}

async fn delete_notification(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<DeleteNotificationQuery>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = query
        .id
        .as_deref()
        .and_then(|id| id.trim().parse::<i32>().ok())
        .ok_or_else(|| AppError::InvalidInput("A valid notification id is required.".to_string()))?;

    services::delete_notification(&app_state.db_pool, id).await?;
    Ok(Json(SuccessResponse::ok()))
}
