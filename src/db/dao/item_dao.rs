use sea_orm::{DatabaseConnection, QueryOrder, Set, prelude::DateTimeWithTimeZone};

use super::{DaoBase, DaoResult};
use crate::db::entities::item;
use crate::db::entities::prelude::Item;

#[derive(Clone)]
pub struct ItemDao {
    db: DatabaseConnection,
}

impl DaoBase for ItemDao {
    type Entity = Item;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl ItemDao {
    pub async fn create_item(&self, name: &str) -> DaoResult<item::Model> {
        let model = item::ActiveModel {
            name: Set(name.to_string()),
            completed: Set(false),
            completed_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Newest first; rows stamped in the same instant fall back to insert order.
    pub async fn list_items(&self) -> DaoResult<Vec<item::Model>> {
        self.find_all(|query| query.order_by_desc(item::Column::Id))
            .await
    }

    /// Writes only the supplied columns that differ from `current`;
    /// `completed_at: Some(None)` clears it. Returns `current` untouched when
    /// nothing differs.
    pub async fn update_item(
        &self,
        current: item::Model,
        name: Option<String>,
        completed: Option<bool>,
        completed_at: Option<Option<DateTimeWithTimeZone>>,
    ) -> DaoResult<item::Model> {
        let name = name.filter(|name| *name != current.name);
        let completed = completed.filter(|completed| *completed != current.completed);
        let completed_at = completed_at.filter(|ts| *ts != current.completed_at);
        if name.is_none() && completed.is_none() && completed_at.is_none() {
            return Ok(current);
        }

        self.update(current, move |active| {
            if let Some(name) = name {
                active.name = Set(name);
            }
            if let Some(completed) = completed {
                active.completed = Set(completed);
            }
            if let Some(completed_at) = completed_at {
                active.completed_at = Set(completed_at);
            }
        })
        .await
    }
}
