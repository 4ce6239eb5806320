pub mod model;
pub mod repository;

pub use model::{Item, ItemDraft};
pub use repository::ItemRepository;
