pub mod ledger;
pub mod model;

pub use ledger::OrderRepository;
pub use model::{Order, OrderStatus};
