use serde_json::{Map, Value};
use tracing::info;

use crate::{
    db::dao::{EntityId, ItemDao},
    db::entities::item,
    error::AppError,
    services::crud_service::{CrudErrors, CrudOp, CrudService},
    services::item_input::{ItemChanges, NewItem},
};

const ITEM_ERRORS: CrudErrors = CrudErrors {
    create_failed: "Could not create item",
    find_failed: "Could not load items",
    not_found: "Item not found",
    update_failed: "Could not update item",
    delete_failed: "Could not delete item",
};

#[derive(Clone)]
pub struct ItemService {
    item_dao: ItemDao,
}

impl ItemService {
    pub fn new(item_dao: ItemDao) -> Self {
        Self { item_dao }
    }

    /// All items, newest first.
    pub async fn list(&self) -> Result<Vec<item::Model>, AppError> {
        self.item_dao
            .list_items()
            .await
            .map_err(|err| self.map_error(CrudOp::List, err))
    }

    pub async fn find(&self, id: EntityId) -> Result<item::Model, AppError> {
        CrudService::find_by_id(self, id).await
    }

    pub async fn insert(&self, new_item: &NewItem) -> Result<item::Model, AppError> {
        let created = self
            .item_dao
            .create_item(new_item.name())
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))?;
        info!(item_id = created.id, "item created");
        Ok(created)
    }

    /// Looks the item up, then validates `fields` and applies only those
    /// supplied. An unknown id is a 404 whatever the body holds.
    pub async fn update(
        &self,
        id: EntityId,
        fields: &Map<String, Value>,
    ) -> Result<item::Model, AppError> {
        let current = self.find(id).await?;
        let (name, completed, completed_at) = ItemChanges::from_fields(fields)?.into_parts();
        let updated = self
            .item_dao
            .update_item(current, name, completed, completed_at)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))?;
        info!(item_id = updated.id, completed = updated.completed, "item updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: EntityId) -> Result<EntityId, AppError> {
        let deleted = CrudService::delete(self, id).await?;
        info!(item_id = deleted, "item deleted");
        Ok(deleted)
    }
}

impl CrudService for ItemService {
    type Dao = ItemDao;

    fn dao(&self) -> &Self::Dao {
        &self.item_dao
    }

    fn errors(&self) -> CrudErrors {
        ITEM_ERRORS
    }
}
