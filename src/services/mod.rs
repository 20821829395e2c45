pub mod context;
pub mod crud_service;
pub mod item_input;
pub mod item_service;

pub use context::ServiceContext;
pub use item_input::NewItem;
pub use item_service::ItemService;
