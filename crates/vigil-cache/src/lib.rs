//! vigil-cache: Resilient async client facade over a remote key-value cache
//!
//! # Features
//!
//! - **Bounded-retry connect** with exponential backoff
//! - **Background health probing** with automatic reconnection
//! - **Retry-wrapped operations** that degrade gracefully when the store
//!   is unavailable
//! - **Typed values** round-tripped through a text codec
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vigil_cache::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let config = ManagerConfig::from_env()?;
//!     let cache = RedisCacheManager::from_config(config);
//!
//!     // Optional at startup: pass `true` to fail hard when the store is
//!     // mandatory, `false` to start in degraded mode.
//!     cache.connect(false).await?;
//!
//!     cache.set("greeting", "hello", None).await;
//!     if let Some(value) = cache.get("greeting").await {
//!         println!("{value}");
//!     }
//!
//!     cache.disconnect().await;
//!     Ok(())
//! }
//! ```

mod manager;

// Re-export core
pub use vigil_cache_core::*;

// Re-export storage
#[cfg(feature = "redis")]
pub use vigil_cache_storage::{RedisConnector, RedisHandle};

// Export manager
pub use manager::CacheManager;

/// Manager wired to the Redis connector
#[cfg(feature = "redis")]
pub type RedisCacheManager = CacheManager<RedisConnector>;

#[cfg(feature = "redis")]
impl CacheManager<RedisConnector> {
    /// Build a manager talking to the Redis store described by `config`
    pub fn from_config(config: ManagerConfig) -> Self {
        CacheManager::new(RedisConnector::new(config.clone()), config)
    }
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CacheError, CacheManager, CacheValue, ConnectionState, HealthReport, HealthStatus,
        Lookup, ManagerConfig, Result,
    };

    #[cfg(feature = "redis")]
    pub use crate::{RedisCacheManager, RedisConnector};
}
