//! Core types for connection state, lookups, and health reporting

mod health;
mod lookup;
mod state;

pub use health::{HealthReport, HealthStatus, StoreInfo};
pub use lookup::Lookup;
pub use state::ConnectionState;
