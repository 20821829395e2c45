use sea_orm::DbErr;

use super::EntityId;

#[derive(Debug, thiserror::Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: EntityId },
}

pub type DaoResult<T> = Result<T, DaoLayerError>;
