use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::{entities::pick_option, services};
use crate::web::{AppError, AppState};

pub fn create_picks_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{category}", get(list_options))
        .route("/{category}/random", get(random_option))
}

/// The two pickers offered to the couple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickCategory {
    Food,
    Activity,
}

impl PickCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PickCategory::Food => "food",
            PickCategory::Activity => "activity",
        }
    }
}

impl fmt::Display for PickCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(PickCategory::Food),
            "activity" => Ok(PickCategory::Activity),
            other => Err(AppError::InvalidInput(format!("Unknown pick category: {other}"))),
        }
    }
}

async fn list_options(
    State(app_state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<pick_option::Model>>, AppError> {
    let category: PickCategory = category.parse()?;
    let options = services::get_options_by_category(&app_state.db_pool, category.as_str()).await?;
    Ok(Json(options))
}

async fn random_option(
    State(app_state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<pick_option::Model>, AppError> {
    let category: PickCategory = category.parse()?;
    let option = services::pick_random_option(&app_state.db_pool, category.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No {category} options yet.")))?;
    Ok(Json(option))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parsing_is_case_insensitive() {
        assert_eq!("Food".parse::<PickCategory>().unwrap(), PickCategory::Food);
        assert_eq!(" activity ".parse::<PickCategory>().unwrap(), PickCategory::Activity);
    }

    #[test]
    fn unknown_category_is_invalid_input() {
        assert!(matches!(
            "movies".parse::<PickCategory>(),
            Err(AppError::InvalidInput(_))
        ));
    }
}
