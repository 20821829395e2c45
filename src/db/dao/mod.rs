pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod item_dao;

pub use base::{DaoBase, EntityId};
pub use base_traits::{HasCreatedAtColumn, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use item_dao::ItemDao;
