use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityName, EntityTrait, FromQueryResult,
    IntoActiveModel, PrimaryKeyTrait, QueryOrder, Select,
};

use super::base_traits::{HasCreatedAtColumn, TimestampedActiveModel};
use super::error::{DaoLayerError, DaoResult};

/// Primary key type shared by the service's tables.
pub type EntityId = i32;

type DaoModel<D> = <<D as DaoBase>::Entity as EntityTrait>::Model;
type DaoActiveModel<D> = <<D as DaoBase>::Entity as EntityTrait>::ActiveModel;

/// Single-row CRUD over one entity. Implementors only provide the
/// connection; timestamps and not-found detection live here.
#[async_trait::async_trait]
pub trait DaoBase: Clone + Send + Sync + Sized
where
    <Self::Entity as EntityTrait>::Model:
        FromQueryResult + IntoActiveModel<<Self::Entity as EntityTrait>::ActiveModel> + Send + Sync,
    <Self::Entity as EntityTrait>::ActiveModel:
        ActiveModelTrait<Entity = Self::Entity> + TimestampedActiveModel + Send,
    <<Self::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType:
        From<EntityId> + Send + Sync,
    Self::Entity: HasCreatedAtColumn,
{
    type Entity: EntityTrait + Send + Sync;

    fn from_db(db: DatabaseConnection) -> Self;

    fn new(db: &DatabaseConnection) -> Self {
        Self::from_db(db.clone())
    }

    fn db(&self) -> &DatabaseConnection;

    fn entity_name() -> &'static str {
        Self::Entity::default().table_name()
    }

    fn not_found(id: EntityId) -> DaoLayerError {
        DaoLayerError::NotFound {
            entity: Self::entity_name(),
            id,
        }
    }

    async fn create(
        &self,
        data: impl IntoActiveModel<DaoActiveModel<Self>> + Send,
    ) -> DaoResult<DaoModel<Self>> {
        let now = Utc::now().fixed_offset();
        let mut active = data.into_active_model();
        active.set_created_at(now);
        active.set_updated_at(now);
        Ok(active.insert(self.db()).await?)
    }

    async fn find_by_id(&self, id: EntityId) -> DaoResult<DaoModel<Self>> {
        Self::Entity::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Every row, newest first. `apply` may append filters or tie-breakers.
    async fn find_all(
        &self,
        apply: impl FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    ) -> DaoResult<Vec<DaoModel<Self>>> {
        let ordered = Self::Entity::find().order_by_desc(Self::Entity::created_at_column());
        Ok(apply(ordered).all(self.db()).await?)
    }

    /// Writes `apply`'s changes to a row the caller already loaded.
    async fn update<F>(&self, model: DaoModel<Self>, apply: F) -> DaoResult<DaoModel<Self>>
    where
        F: for<'a> FnOnce(&'a mut DaoActiveModel<Self>) + Send,
    {
        let mut active = model.into_active_model();
        apply(&mut active);
        active.set_updated_at(Utc::now().fixed_offset());

        Ok(active.update(self.db()).await?)
    }

    async fn delete(&self, id: EntityId) -> DaoResult<EntityId> {
        let result = Self::Entity::delete_by_id(id).exec(self.db()).await?;

        if result.rows_affected == 0 {
            return Err(Self::not_found(id));
        }

        Ok(id)
    }
}
