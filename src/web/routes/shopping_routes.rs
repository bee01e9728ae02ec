use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::{entities::shopping_item, services};
use crate::web::models::{SuccessResponse, double_option, optional_text, required_text};
use crate::web::{AppError, AppState};

pub fn create_shopping_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/checked", delete(clear_checked_items))
        .route("/{id}", patch(update_item).delete(delete_item))
}

// --- Request/Response Structs ---

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    name: String,
    quantity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    quantity: Option<Option<String>>,
    checked: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ClearCheckedResponse {
    deleted: u64,
}

// --- Route Handlers ---

async fn list_items(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<shopping_item::Model>>, AppError> {
    Ok(Json(services::get_all_items(&app_state.db_pool).await?))
}

async fn create_item(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateItemRequest>, AppError>,
) -> Result<(StatusCode, Json<shopping_item::Model>), AppError> {
    let name = required_text(&payload.name)
        .ok_or_else(|| AppError::InvalidInput("Item name is required.".to_string()))?;
    let item = services::create_item(
        &app_state.db_pool,
        name,
        optional_text(payload.quantity.as_deref()),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateItemRequest>, AppError>,
) -> Result<Json<shopping_item::Model>, AppError> {
    let name = match payload.name.as_deref() {
        Some(name) => Some(
            required_text(name)
                .ok_or_else(|| AppError::InvalidInput("Item name cannot be blank.".to_string()))?,
        ),
        None => None,
    };
    let quantity = payload
        .quantity
        .as_ref()
        .map(|quantity| optional_text(quantity.as_deref()));

    let item = services::update_item(&app_state.db_pool, id, name, quantity, payload.checked)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shopping item {id} not found.")))?;
    Ok(Json(item))
}

async fn delete_item(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<SuccessResponse>, AppError> {
    let delete_result = services::delete_item(&app_state.db_pool, id).await?;
    if delete_result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Shopping item {id} not found.")));
    }
    Ok(Json(SuccessResponse::ok()))
}

async fn clear_checked_items(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<ClearCheckedResponse>, AppError> {
    let delete_result = services::delete_checked_items(&app_state.db_pool).await?;
    Ok(Json(ClearCheckedResponse {
        deleted: delete_result.rows_affected,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_body_distinguishes_null_from_absent_quantity() {
        let absent: UpdateItemRequest = serde_json::from_str(r#"{"checked":true}"#).unwrap();
        assert_eq!(absent.quantity, None);

        let cleared: UpdateItemRequest = serde_json::from_str(r#"{"quantity":null}"#).unwrap();
        assert_eq!(cleared.quantity, Some(None));

        let set: UpdateItemRequest = serde_json::from_str(r#"{"quantity":"2 kg"}"#).unwrap();
        assert_eq!(set.quantity, Some(Some("2 kg".to_string())));
    }
}
