mod entry;
pub mod extract;
pub mod items;
pub mod views;

pub use entry::{build_app, router};
pub use items::{CREATED_PARAM, DeletedItem, ERROR_PARAM, ItemResponse};
