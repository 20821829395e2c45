use sea_orm::EntityTrait;

use crate::db::dao::{DaoBase, DaoLayerError, EntityId};
use crate::error::AppError;

type CrudModel<D> = <<D as DaoBase>::Entity as EntityTrait>::Model;

#[derive(Clone, Copy)]
pub struct CrudErrors {
    pub create_failed: &'static str,
    pub find_failed: &'static str,
    pub not_found: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
}

impl Default for CrudErrors {
    fn default() -> Self {
        Self {
            create_failed: "Create failed",
            find_failed: "Find failed",
            not_found: "Resource not found",
            update_failed: "Update failed",
            delete_failed: "Delete failed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrudOp {
    Create,
    Find,
    List,
    Update,
    Delete,
}

/// Store-backed CRUD with DAO failures translated into HTTP-facing errors.
#[async_trait::async_trait]
pub trait CrudService {
    type Dao: DaoBase;

    fn dao(&self) -> &Self::Dao;

    fn errors(&self) -> CrudErrors {
        CrudErrors::default()
    }

    fn map_error(&self, op: CrudOp, err: DaoLayerError) -> AppError {
        let errors = self.errors();
        match err {
            DaoLayerError::Db(db_err) => {
                let context = match op {
                    CrudOp::Create => errors.create_failed,
                    CrudOp::Find | CrudOp::List => errors.find_failed,
                    CrudOp::Update => errors.update_failed,
                    CrudOp::Delete => errors.delete_failed,
                };
                let message = format!("{context}. Please check the logs for more details");
                AppError::store_with_source(message, db_err)
            }
            DaoLayerError::NotFound { .. } => AppError::not_found(errors.not_found),
        }
    }

    async fn find_by_id(&self, id: EntityId) -> Result<CrudModel<Self::Dao>, AppError> {
        self.dao()
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))
    }

    async fn delete(&self, id: EntityId) -> Result<EntityId, AppError> {
        self.dao()
            .delete(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Delete, err))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use axum::http::StatusCode;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    use super::{CrudErrors, CrudOp, CrudService};
    use crate::db::dao::{DaoBase, DaoLayerError, ItemDao};

    struct PlainService {
        dao: ItemDao,
    }

    impl CrudService for PlainService {
        type Dao = ItemDao;

        fn dao(&self) -> &Self::Dao {
            &self.dao
        }
    }

    fn service() -> PlainService {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        PlainService {
            dao: ItemDao::new(&db),
        }
    }

    #[test]
    fn db_errors_become_store_errors_with_source() {
        let err = service().map_error(
            CrudOp::Update,
            DaoLayerError::Db(DbErr::Custom("disk full".to_string())),
        );

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message(),
            "Update failed. Please check the logs for more details"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn list_and_find_share_the_find_context() {
        let errors = CrudErrors::default();
        let svc = service();
        for op in [CrudOp::Find, CrudOp::List] {
            let err = svc.map_error(op, DaoLayerError::Db(DbErr::Custom("boom".to_string())));
            assert!(err.message().starts_with(errors.find_failed));
        }
    }

    #[test]
    fn missing_rows_become_not_found() {
        let err = service().map_error(
            CrudOp::Delete,
            DaoLayerError::NotFound {
                entity: "items",
                id: 4,
            },
        );

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Resource not found");
    }
}
