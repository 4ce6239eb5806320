pub mod booking;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod market;
pub mod order;
pub mod selection;
pub mod session;
pub mod stats;
pub mod storage;
pub mod sync;
