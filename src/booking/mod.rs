pub mod ledger;
pub mod model;

pub use ledger::BookingRepository;
pub use model::{pending_count, Booking, BookingStatus};
