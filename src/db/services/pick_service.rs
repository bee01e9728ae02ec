use chrono::Utc;
use rand::seq::IndexedRandom;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};

use crate::db::entities::pick_option;

// --- Random Picker Service Functions ---

pub async fn get_options_by_category(
    db: &DatabaseConnection,
    category: &str,
) -> Result<Vec<pick_option::Model>, DbErr> {
    pick_option::Entity::find()
        .filter(pick_option::Column::Category.eq(category))
        .order_by_asc(pick_option::Column::Name)
        .all(db)
        .await
}

/// Picks one option of the category uniformly at random, `None` if the category is empty.
pub async fn pick_random_option(
    db: &DatabaseConnection,
    category: &str,
) -> Result<Option<pick_option::Model>, DbErr> {
    let options = get_options_by_category(db, category).await?;
    Ok(options.choose(&mut rand::rng()).cloned())
}

pub async fn create_option(
    db: &DatabaseConnection,
    category: &str,
    name: &str,
    details: Option<&str>,
) -> Result<pick_option::Model, DbErr> {
    pick_option::ActiveModel {
        category: Set(category.to_owned()),
        name: Set(name.to_owned()),
        details: Set(details.map(str::to_owned)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Updates an option; `None` when no option has this id.
pub async fn update_option(
    db: &DatabaseConnection,
    id: i32,
    category: &str,
    name: &str,
    details: Option<&str>,
) -> Result<Option<pick_option::Model>, DbErr> {
    let Some(existing) = pick_option::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active_option = existing.into_active_model();
    active_option.category = Set(category.to_owned());
    active_option.name = Set(name.to_owned());
    active_option.details = Set(details.map(str::to_owned));
    active_option.update(db).await.map(Some)
}

pub async fn delete_option(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
    pick_option::Entity::delete_by_id(id).exec(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[tokio::test]
    async fn random_pick_stays_within_category() {
        let db = test_db().await;
        create_option(&db, "food", "Ramen", None).await.unwrap();
        create_option(&db, "food", "Tacos", Some("the place on 5th")).await.unwrap();
        create_option(&db, "activity", "Bowling", None).await.unwrap();

        for _ in 0..10 {
            let picked = pick_random_option(&db, "food").await.unwrap().unwrap();
            assert_eq!(picked.category, "food");
        }
    }

    #[tokio::test]
    async fn random_pick_on_empty_category_is_none() {
        let db = test_db().await;
        assert!(pick_random_option(&db, "activity").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_option_returns_none() {
        let db = test_db().await;
        let updated = update_option(&db, 42, "food", "Pho", None).await.unwrap();
        assert!(updated.is_none());
    }
}
