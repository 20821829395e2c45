use sea_orm::DatabaseConnection;
use tracing::info;

use crate::{config::DatabaseConfig, db::providers};

/// Module path prefix under which the service's entities register themselves.
pub const ENTITY_REGISTRY: &str = "item_tracker::db::entities::*";

/// Opens the item store and creates any missing tables.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = providers::default_registry()?.connect(cfg).await?;
    info!("syncing database schema from entities");
    db.get_schema_registry(ENTITY_REGISTRY).sync(&db).await?;
    Ok(db)
}
