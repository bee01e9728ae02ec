use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::memory_routes::MemoryRequest;
use super::pick_routes::PickCategory;
use crate::db::{
    entities::{memory, pick_option, push_subscription},
    services,
};
use crate::web::models::{AuthenticatedAdmin, SuccessResponse, optional_text, required_text};
use crate::web::{AppError, AppState};

pub fn create_admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/picks", post(create_pick))
        .route("/picks/{id}", put(update_pick).delete(delete_pick))
        .route("/memories/{id}", put(update_memory).delete(delete_memory))
        .route("/subscriptions", get(list_subscriptions))
        .route("/subscriptions/{id}", delete(delete_subscription))
}

// --- Request/Response Structs ---

#[derive(Debug, Deserialize)]
pub struct PickOptionRequest {
    category: String,
    name: String,
    details: Option<String>,
}

/// Subscription as shown to the admin; the push keys stay server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    id: i32,
    user_name: String,
    endpoint: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<push_subscription::Model> for SubscriptionResponse {
    fn from(model: push_subscription::Model) -> Self {
        Self {
            id: model.id,
            user_name: model.user_name,
            endpoint: model.endpoint,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl PickOptionRequest {
    fn validated(&self) -> Result<(PickCategory, &str, Option<&str>), AppError> {
        let category: PickCategory = self.category.parse()?;
        let name = required_text(&self.name)
            .ok_or_else(|| AppError::InvalidInput("Option name is required.".to_string()))?;
        Ok((category, name, optional_text(self.details.as_deref())))
    }
}

// --- Picks ---

async fn create_pick(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<PickOptionRequest>, AppError>,
) -> Result<(StatusCode, Json<pick_option::Model>), AppError> {
    let (category, name, details) = payload.validated()?;
    let option = services::create_option(&app_state.db_pool, category.as_str(), name, details).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

async fn update_pick(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    WithRejection(Json(payload), _): WithRejection<Json<PickOptionRequest>, AppError>,
) -> Result<Json<pick_option::Model>, AppError> {
    let (category, name, details) = payload.validated()?;
    let option = services::update_option(&app_state.db_pool, id, category.as_str(), name, details)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pick option {id} not found.")))?;
    Ok(Json(option))
}

async fn delete_pick(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<SuccessResponse>, AppError> {
    let delete_result = services::delete_option(&app_state.db_pool, id).await?;
    if delete_result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Pick option {id} not found.")));
    }
    Ok(Json(SuccessResponse::ok()))
}

// --- Memories ---

async fn update_memory(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    WithRejection(Json(payload), _): WithRejection<Json<MemoryRequest>, AppError>,
) -> Result<Json<memory::Model>, AppError> {
    let memory = services::update_memory(&app_state.db_pool, id, payload.fields()?)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Memory {id} not found.")))?;
    Ok(Json(memory))
}

async fn delete_memory(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<SuccessResponse>, AppError> {
    let delete_result = services::delete_memory(&app_state.db_pool, id).await?;
    if delete_result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Memory {id} not found.")));
    }
    Ok(Json(SuccessResponse::ok()))
}

// --- Subscriptions ---

async fn list_subscriptions(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<SubscriptionResponse>>, AppError> {
    let subscriptions = services::get_all_subscriptions(&app_state.db_pool).await?;
    Ok(Json(subscriptions.into_iter().map(SubscriptionResponse::from).collect()))
}

async fn delete_subscription(
    Extension(admin): Extension<AuthenticatedAdmin>,
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<SuccessResponse>, AppError> {
    let delete_result = services::delete_subscription(&app_state.db_pool, id).await?;
    if delete_result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Subscription {id} not found.")));
    }
    info!(subscription_id = id, admin = %admin.subject, "Subscription removed by admin.");
    Ok(Json(SuccessResponse::ok()))
}
