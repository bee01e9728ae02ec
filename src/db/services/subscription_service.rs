use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait, QueryFilter, QueryOrder,
    Set, sea_query::OnConflict,
};

use crate::db::entities::push_subscription;

// --- Push Subscription Service Functions ---

/// Inserts a subscription, or updates the row already registered for the same endpoint.
///
/// The row keeps its id across re-registrations; the unique `endpoint`
/// column is the conflict target.
pub async fn upsert_subscription(
    db: &DatabaseConnection,
    user_name: &str,
    endpoint: &str,
    subscription_json: &str,
) -> Result<push_subscription::Model, DbErr> {
    let now = Utc::now();
    let active_subscription = push_subscription::ActiveModel {
        user_name: Set(user_name.to_owned()),
        endpoint: Set(endpoint.to_owned()),
        subscription: Set(subscription_json.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    push_subscription::Entity::insert(active_subscription)
        .on_conflict(
            OnConflict::column(push_subscription::Column::Endpoint)
                .update_columns([
                    push_subscription::Column::UserName,
                    push_subscription::Column::Subscription,
                    push_subscription::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    find_by_endpoint(db, endpoint)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("push subscription for endpoint {endpoint}")))
}

/// Retrieves the subscription registered for an endpoint.
pub async fn find_by_endpoint(
    db: &DatabaseConnection,
    endpoint: &str,
) -> Result<Option<push_subscription::Model>, DbErr> {
    push_subscription::Entity::find()
        .filter(push_subscription::Column::Endpoint.eq(endpoint))
        .one(db)
        .await
}

/// Every subscription not owned by `user_name`; a sender never pages themself.
pub async fn get_subscriptions_excluding_user(
    db: &DatabaseConnection,
    user_name: &str,
) -> Result<Vec<push_subscription::Model>, DbErr> {
    push_subscription::Entity::find()
        .filter(push_subscription::Column::UserName.ne(user_name))
        .order_by_asc(push_subscription::Column::Id)
        .all(db)
        .await
}

pub async fn get_all_subscriptions(
    db: &DatabaseConnection,
) -> Result<Vec<push_subscription::Model>, DbErr> {
    push_subscription::Entity::find()
        .order_by_asc(push_subscription::Column::UserName)
        .order_by_asc(push_subscription::Column::Id)
        .all(db)
        .await
}

pub async fn delete_subscription(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
    push_subscription::Entity::delete_by_id(id).exec(db).await
}

pub async fn delete_subscription_by_endpoint(
    db: &DatabaseConnection,
    endpoint: &str,
) -> Result<DeleteResult, DbErr> {
    push_subscription::Entity::delete_many()
        .filter(push_subscription::Column::Endpoint.eq(endpoint))
        .exec(db)
        .await
}
