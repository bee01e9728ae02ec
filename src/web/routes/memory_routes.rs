use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use axum_extra::extract::WithRejection;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{entities::memory, services};
use crate::web::models::{optional_text, required_text};
use crate::web::{AppError, AppState};

pub fn create_memories_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_memories).post(create_memory))
}

/// Body for creating a memory, also used by the admin edit route.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRequest {
    pub title: String,
    pub description: Option<String>,
    pub happened_on: NaiveDate,
    pub location: Option<String>,
}

impl MemoryRequest {
    pub fn fields(&self) -> Result<services::MemoryFields<'_>, AppError> {
        let title = required_text(&self.title)
            .ok_or_else(|| AppError::InvalidInput("Memory title is required.".to_string()))?;
        Ok(services::MemoryFields {
            title,
            description: optional_text(self.description.as_deref()),
            happened_on: self.happened_on,
            location: optional_text(self.location.as_deref()),
        })
    }
}

async fn list_memories(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<memory::Model>>, AppError> {
    Ok(Json(services::get_all_memories(&app_state.db_pool).await?))
}

async fn create_memory(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<MemoryRequest>, AppError>,
) -> Result<(StatusCode, Json<memory::Model>), AppError> {
    let memory = services::create_memory(&app_state.db_pool, payload.fields()?).await?;
    Ok((StatusCode::CREATED, Json(memory)))
}
