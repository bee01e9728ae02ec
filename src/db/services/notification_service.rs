use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::db::entities::notification;

/// How many history rows the history endpoint returns.
pub const RECENT_NOTIFICATIONS_LIMIT: u64 = 20;

// --- Notification History Service Functions ---

/// The most recent history row sent by `sender`, used by the cooldown gate.
pub async fn get_last_notification_by_sender(
    db: &DatabaseConnection,
    sender: &str,
) -> Result<Option<notification::Model>, DbErr> {
    notification::Entity::find()
        .filter(notification::Column::Sender.eq(sender))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .one(db)
        .await
}

pub async fn get_recent_notifications(
    db: &DatabaseConnection,
) -> Result<Vec<notification::Model>, DbErr> {
    notification::Entity::find()
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .limit(RECENT_NOTIFICATIONS_LIMIT)
        .all(db)
        .await
}

/// Appends a history row. Rows are never updated afterwards.
pub async fn create_notification(
    db: &DatabaseConnection,
    title: &str,
    body: &str,
    sender: &str,
    created_at: DateTime<Utc>,
) -> Result<notification::Model, DbErr> {
    notification::ActiveModel {
        title: Set(title.to_owned()),
        body: Set(body.to_owned()),
        sender: Set(sender.to_owned()),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn delete_notification(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
    notification::Entity::delete_by_id(id).exec(db).await
}
