use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait, IntoActiveModel,
    QueryOrder, Set,
};

use crate::db::entities::memory;

// --- Memories Service Functions ---

/// Values for creating or replacing a memory.
#[derive(Debug, Clone)]
pub struct MemoryFields<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub happened_on: NaiveDate,
    pub location: Option<&'a str>,
}

pub async fn get_all_memories(db: &DatabaseConnection) -> Result<Vec<memory::Model>, DbErr> {
    memory::Entity::find()
        .order_by_desc(memory::Column::HappenedOn)
        .order_by_desc(memory::Column::Id)
        .all(db)
        .await
}

pub async fn create_memory(
    db: &DatabaseConnection,
    fields: MemoryFields<'_>,
) -> Result<memory::Model, DbErr> {
    memory::ActiveModel {
        title: Set(fields.title.to_owned()),
        description: Set(fields.description.map(str::to_owned)),
        happened_on: Set(fields.happened_on),
        location: Set(fields.location.map(str::to_owned)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn update_memory(
    db: &DatabaseConnection,
    id: i32,
    fields: MemoryFields<'_>,
) -> Result<Option<memory::Model>, DbErr> {
    let Some(existing) = memory::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active_memory = existing.into_active_model();
    active_memory.title = Set(fields.title.to_owned());
    active_memory.description = Set(fields.description.map(str::to_owned));
    active_memory.happened_on = Set(fields.happened_on);
    active_memory.location = Set(fields.location.map(str::to_owned));
    active_memory.update(db).await.map(Some)
}

pub async fn delete_memory(db: &DatabaseConnection, id: i32) -> Result<DeleteResult, DbErr> {
    memory::Entity::delete_by_id(id).exec(db).await
}
