use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};

use crate::db::entities::shopping_item;

// --- Shopping List Service Functions ---

/// Unchecked items first, each group in creation order.
pub async fn get_all_items(db: &DatabaseConnection) -> Result<Vec<shopping_item::Model>, DbErr> {
    shopping_item::Entity::find()
        .order_by_asc(shopping_item::Column::Checked)
        .order_by_asc(shopping_item::Column::CreatedAt)
        .order_by_asc(shopping_item::Column::Id)
        .all(db)
        .await
}

pub async fn create_item(
    db: &DatabaseConnection,
    name: &str,
    quantity: Option<&str>,
) -> Result<shopping_item::Model, DbErr> {
    let now = Utc::now();
    shopping_item::ActiveModel {
        name: Set(name.to_owned()),
        quantity: Set(quantity.map(str::to_owned)),
        checked: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Partial update of an item; `quantity: Some(None)` clears the quantity.
pub async fn update_item(
    db: &DatabaseConnection,
    id: i32,
    name: Option<&str>,
    quantity: Option<Option<&str>>,
    checked: Option<bool>,
) -> Result<Option<shopping_item::Model>, DbErr> {
    let Some(existing) = shopping_item::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active_item = existing.into_active_model();
    if let Some(name) = name {
        active_item.name = Set(name.to_owned());
    }
    if let Some(quantity) = quantity {
        active_item.quantity = Set(quantity.map(str::to_owned));
    }
    if let Some(checked) = checked {
        active_item.checked = Set(checked);
    }
    active_item.updated_at = Set(Utc::now());
    active_item.update(db).await.map(Some)
}

pub async fn delete_item(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
    shopping_item::Entity::delete_by_id(id).exec(db).await
}

pub async fn delete_checked_items(db: &DatabaseConnection) -> Result<DeleteResult, DbErr> {
    shopping_item::Entity::delete_many()
        .filter(shopping_item::Column::Checked.eq(true))
        .exec(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[tokio::test]
    async fn checked_items_sort_last_and_can_be_cleared() {
        let db = test_db().await;
        let milk = create_item(&db, "Milk", Some("2L")).await.unwrap();
        create_item(&db, "Eggs", None).await.unwrap();
        update_item(&db, milk.id, None, None, Some(true)).await.unwrap();

        let items = get_all_items(&db).await.unwrap();
        assert_eq!(items[0].name, "Eggs");
        assert_eq!(items[1].name, "Milk");
        assert!(items[1].checked);

        let deleted = delete_checked_items(&db).await.unwrap();
        assert_eq!(deleted.rows_affected, 1);
        assert_eq!(get_all_items(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_can_clear_quantity() {
        let db = test_db().await;
        let item = create_item(&db, "Apples", Some("6")).await.unwrap();

        let updated = update_item(&db, item.id, Some("Green apples"), Some(None), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Green apples");
        assert_eq!(updated.quantity, None);
        assert!(!updated.checked);
    }
}
