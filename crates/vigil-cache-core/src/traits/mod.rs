//! Core traits for store access

mod store;

pub use store::{StoreConnector, StoreHandle};
