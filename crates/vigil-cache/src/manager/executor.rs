//! Retry-wrapped operation executor
//!
//! The single chokepoint every cache operation passes through.

use std::future::Future;

use tokio::time::sleep;
use tracing::warn;

use vigil_cache_core::{CacheError, Result, StoreConnector};

use super::CacheManager;

impl<C: StoreConnector> CacheManager<C> {
    /// Run one store operation with reconnect-and-retry semantics.
    ///
    /// Ensures a live connection first; that preliminary non-required
    /// connect is not charged against the operation's attempts, and its
    /// failure fails the operation immediately. Transient failures mark
    /// the manager disconnected, wait the fixed base delay, reconnect
    /// without requiring success, and retry. Protocol and unclassified
    /// errors are re-raised untouched on the first occurrence.
    pub(crate) async fn execute<T, F, Fut>(&self, op: &'static str, call: F) -> Result<T>
    where
        F: Fn(C::Handle) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.is_connected() {
            let connected = self.connect(false).await.unwrap_or(false);
            if !connected {
                return Err(CacheError::Connection("cache store not available".into()));
            }
        }

        let policy = self.inner.op_policy;
        let mut last_err: Option<CacheError> = None;

        for attempt in 0..policy.attempts {
            let outcome = match self.current_handle() {
                Some(handle) => call(handle).await,
                None => Err(CacheError::Connection("no live store handle".into())),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    warn!(op, attempt, error = %err, "transient cache store failure");
                    self.mark_disconnected();
                    last_err = Some(err);
                    if !policy.is_last(attempt) {
                        sleep(policy.delay_for(attempt)).await;
                        let _ = self.connect(false).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        let detail = last_err
            .map(|err| err.to_string())
            .unwrap_or_else(|| "retries exhausted".to_string());
        Err(CacheError::Connection(format!(
            "{op} failed after retries: {detail}"
        )))
    }
}
