use sea_orm::DatabaseConnection;

use super::{DaoBase, ItemDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn item(&self) -> ItemDao {
        DaoBase::new(&self.db)
    }
}
