//! vigil-cache-storage: Store connectors for vigil-cache
//!
//! The `redis` feature (default) provides the production connector backed
//! by a bb8 connection pool. The `mock` feature provides a scripted
//! in-memory store for tests.

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "redis")]
pub use redis::{RedisConnector, RedisHandle};

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockConnector, MockHandle, MockStore};
