//! Store connector and handle traits
//!
//! The manager is generic over these two traits: a connector that builds
//! fresh handles, and the handle itself, which issues requests against the
//! remote store. Production code plugs in the Redis implementation; tests
//! plug in a scripted in-memory store.

use std::time::Duration;

use async_trait::async_trait;

use crate::{Result, StoreInfo};

/// Factory for live store handles
///
/// `connect` constructs a fresh, unprobed handle. Liveness is the caller's
/// concern: the connection supervisor pings each new handle before
/// installing it.
#[async_trait]
pub trait StoreConnector: Send + Sync + 'static {
    /// The handle type this connector produces
    type Handle: StoreHandle;

    /// Construct a fresh handle to the store
    async fn connect(&self) -> Result<Self::Handle>;
}

/// A live handle to the remote key-value store
///
/// Handles are cheap to clone and safe to use from many tasks at once;
/// the manager replaces a handle (never mutates it) on reconnect.
#[async_trait]
pub trait StoreHandle: Clone + Send + Sync + 'static {
    /// Liveness probe
    async fn ping(&self) -> Result<()>;

    /// Get the text payload stored under `key`
    ///
    /// Returns `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a text payload under `key`, with optional expiry
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Delete `key`
    ///
    /// Returns `true` if the key existed and was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Check whether `key` exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Set the expiry of an existing key
    ///
    /// Returns `false` when the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// List keys matching a glob pattern
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Store-reported metrics, used by health reporting
    async fn info(&self) -> Result<StoreInfo>;

    /// Release the underlying network resources
    async fn close(&self) -> Result<()>;
}
