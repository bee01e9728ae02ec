pub mod entities;
pub mod schema;
pub mod services;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// Opens the store handle shared by the dispatcher and the HTTP layer.
///
/// For `sqlite::memory:` callers must pass `max_connections = 1`. Every
/// pooled connection would otherwise see its own empty database.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(opt).await
}

#[cfg(test)]
pub(crate) async fn test_db() -> DatabaseConnection {
    let db = connect("sqlite::memory:", 1).await.expect("in-memory sqlite");
    schema::ensure_schema(&db).await.expect("schema");
    db
}
