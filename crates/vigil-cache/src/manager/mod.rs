//! High-level cache manager
//!
//! One `CacheManager` instance is shared across many request-handling
//! tasks. It owns the connection lifecycle, runs a single background
//! health monitor, and funnels every cache operation through a
//! retry-wrapped executor so that store unavailability degrades callers
//! to neutral results instead of failing them.

mod executor;
mod monitor;
mod supervisor;

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use vigil_cache_core::{
    CacheValue, ConnectionState, HealthReport, Lookup, ManagerConfig, RetryPolicy,
    StoreConnector, StoreHandle,
};

/// Timeout for the liveness probe of a freshly constructed handle
pub(crate) const CONNECT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for background and on-demand health probes
pub(crate) const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Resilient cache manager, generic over the store connector
///
/// Cloning is cheap and shares the underlying state; hand clones to
/// request handlers instead of a global instance.
pub struct CacheManager<C: StoreConnector> {
    inner: Arc<Inner<C>>,
}

pub(crate) struct Inner<C: StoreConnector> {
    pub(crate) connector: C,
    pub(crate) config: ManagerConfig,
    pub(crate) connect_policy: RetryPolicy,
    pub(crate) op_policy: RetryPolicy,
    /// Serializes connect/reconnect/disconnect sequences and owns the
    /// monitor task registration.
    pub(crate) lifecycle: Mutex<Lifecycle>,
    /// Snapshot of connectivity, readable without touching the lifecycle
    /// lock. Ordinary operations clone the handle out of here and issue
    /// their network call without holding anything.
    pub(crate) live: RwLock<Live<C::Handle>>,
}

pub(crate) struct Lifecycle {
    pub(crate) monitor: Option<JoinHandle<()>>,
}

pub(crate) struct Live<H> {
    pub(crate) state: ConnectionState,
    pub(crate) handle: Option<H>,
}

impl<C: StoreConnector> CacheManager<C> {
    /// Create a manager around `connector`
    ///
    /// No connection is attempted until [`connect`](Self::connect) or the
    /// first operation.
    pub fn new(connector: C, config: ManagerConfig) -> Self {
        let connect_policy =
            RetryPolicy::exponential(config.retry_attempts, config.base_retry_delay);
        let op_policy = RetryPolicy::fixed(config.retry_attempts, config.base_retry_delay);

        Self {
            inner: Arc::new(Inner {
                connector,
                config,
                connect_policy,
                op_policy,
                lifecycle: Mutex::new(Lifecycle { monitor: None }),
                live: RwLock::new(Live {
                    state: ConnectionState::Disconnected,
                    handle: None,
                }),
            }),
        }
    }

    /// The configuration this manager was built with
    pub fn config(&self) -> &ManagerConfig {
        &self.inner.config
    }

    /// Look up a key, distinguishing a missing key from an unavailable store
    pub async fn lookup(&self, key: &str) -> Lookup {
        match self
            .execute("get", |handle| async move { handle.get(key).await })
            .await
        {
            Ok(Some(value)) => Lookup::Found(value),
            Ok(None) => Lookup::Missing,
            Err(err) => {
                warn!(key, error = %err, "cache get degraded");
                Lookup::Unavailable
            }
        }
    }

    /// Get the text payload stored under `key`
    ///
    /// Legacy collapsed form: a missing key and an unavailable store both
    /// come back as `None`. Use [`lookup`](Self::lookup) to tell them
    /// apart.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.lookup(key).await.into_option()
    }

    /// Get and decode a structured value stored under `key`
    ///
    /// A malformed payload is logged and treated as absent, never as a
    /// hard failure.
    pub async fn get_structured<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "malformed structured cache payload");
                None
            }
        }
    }

    /// Store a value under `key`, with optional expiry
    ///
    /// Returns `false` on any failure, store rejection and unavailability
    /// alike; never fails the caller.
    pub async fn set(
        &self,
        key: &str,
        value: impl Into<CacheValue>,
        ttl: Option<Duration>,
    ) -> bool {
        let payload = match value.into().encode() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key, error = %err, "cache value encoding failed");
                return false;
            }
        };

        match self
            .execute("set", |handle| {
                let payload = payload.clone();
                async move { handle.set(key, &payload, ttl).await }
            })
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "cache set degraded");
                false
            }
        }
    }

    /// Serialize any serde value and store it under `key`
    pub async fn set_structured<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> bool {
        match CacheValue::structured(value) {
            Ok(value) => self.set(key, value, ttl).await,
            Err(err) => {
                warn!(key, error = %err, "cache value serialization failed");
                false
            }
        }
    }

    /// Delete `key`; true only if it existed and was removed
    pub async fn delete(&self, key: &str) -> bool {
        match self
            .execute("delete", |handle| async move { handle.delete(key).await })
            .await
        {
            Ok(removed) => removed,
            Err(err) => {
                warn!(key, error = %err, "cache delete degraded");
                false
            }
        }
    }

    /// Check whether `key` exists
    pub async fn exists(&self, key: &str) -> bool {
        match self
            .execute("exists", |handle| async move { handle.exists(key).await })
            .await
        {
            Ok(present) => present,
            Err(err) => {
                warn!(key, error = %err, "cache exists degraded");
                false
            }
        }
    }

    /// Set the expiry of an existing key
    pub async fn expire(&self, key: &str, ttl: Duration) -> bool {
        match self
            .execute("expire", |handle| async move {
                handle.expire(key, ttl).await
            })
            .await
        {
            Ok(applied) => applied,
            Err(err) => {
                warn!(key, error = %err, "cache expire degraded");
                false
            }
        }
    }

    /// List keys matching a glob pattern; empty on failure, never absent
    pub async fn scan_keys(&self, pattern: &str) -> Vec<String> {
        match self
            .execute("scan", |handle| async move {
                handle.scan_keys(pattern).await
            })
            .await
        {
            Ok(keys) => keys,
            Err(err) => {
                warn!(pattern, error = %err, "cache key scan degraded");
                Vec::new()
            }
        }
    }

    /// Probe the connection once and report transparently.
    ///
    /// Bypasses the retry executor: a disconnected manager reports
    /// `disconnected` without probing, and a failed probe reports
    /// `unhealthy` without touching connection state. Latency is the
    /// measured probe round-trip.
    pub async fn health_check(&self) -> HealthReport {
        let Some(handle) = self.current_handle() else {
            return HealthReport::disconnected();
        };

        let started = Instant::now();
        match timeout(HEALTH_PROBE_TIMEOUT, handle.ping()).await {
            Ok(Ok(())) => {
                let latency = started.elapsed();
                let store = match timeout(HEALTH_PROBE_TIMEOUT, handle.info()).await {
                    Ok(Ok(info)) => Some(info),
                    Ok(Err(err)) => {
                        debug!(error = %err, "store stats unavailable");
                        None
                    }
                    Err(_) => None,
                };
                HealthReport::healthy(latency, store)
            }
            Ok(Err(err)) => HealthReport::unhealthy(started.elapsed(), err.to_string()),
            Err(_) => HealthReport::unhealthy(started.elapsed(), "health probe timed out"),
        }
    }
}

impl<C: StoreConnector> Clone for CacheManager<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
