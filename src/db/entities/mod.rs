#[allow(unused_imports)]
pub mod prelude {
    pub use super::item::Entity as Item;
}

pub mod item;
