//! Redis store connector

mod connector;
mod info;

pub use connector::{RedisConnector, RedisHandle};
