//! Connection supervisor: bounded-retry connect, disconnect, state reads

use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use vigil_cache_core::{CacheError, ConnectionState, Result, StoreConnector, StoreHandle};

use super::{CONNECT_PROBE_TIMEOUT, CacheManager, Lifecycle, monitor};

impl<C: StoreConnector> CacheManager<C> {
    /// Establish a connection to the store.
    ///
    /// Serialized against other connect/disconnect callers: concurrent
    /// callers block until the winner finishes, then observe `Connected`
    /// and return immediately. Performs up to the configured number of
    /// attempts, each a fresh handle plus a bounded liveness probe, with
    /// exponential backoff in between. On success the health monitor is
    /// started.
    ///
    /// When every attempt fails: fails with [`CacheError::Connection`] if
    /// `required`, otherwise logs and returns `false` so the caller can
    /// run in degraded mode.
    pub async fn connect(&self, required: bool) -> Result<bool> {
        self.connect_inner(required, false).await
    }

    pub(crate) async fn connect_inner(
        &self,
        required: bool,
        replace_monitor: bool,
    ) -> Result<bool> {
        let mut lifecycle = self.inner.lifecycle.lock().await;

        if self.is_connected() {
            return Ok(true);
        }
        self.inner.live.write().state = ConnectionState::Connecting;

        let policy = self.inner.connect_policy;
        let mut last_err: Option<CacheError> = None;

        for attempt in 0..policy.attempts {
            match self.probe_fresh_handle().await {
                Ok(handle) => {
                    {
                        let mut live = self.inner.live.write();
                        live.state = ConnectionState::Connected;
                        live.handle = Some(handle);
                    }
                    self.ensure_monitor(&mut lifecycle, replace_monitor);
                    info!(
                        url = %self.inner.config.connection_url(),
                        attempt,
                        "connected to cache store"
                    );
                    return Ok(true);
                }
                Err(err) if err.is_transient() => {
                    warn!(attempt, error = %err, "cache store probe failed");
                    last_err = Some(err);
                    if !policy.is_last(attempt) {
                        sleep(policy.delay_for(attempt)).await;
                    }
                }
                Err(err) => {
                    error!(error = %err, "unexpected error constructing store handle");
                    last_err = Some(err);
                    break;
                }
            }
        }

        self.inner.live.write().state = ConnectionState::Disconnected;

        let detail = match last_err {
            Some(err) => format!("cache store unavailable: {err}"),
            None => "cache store unavailable".to_string(),
        };
        if required {
            Err(CacheError::Connection(detail))
        } else {
            warn!(error = %detail, "continuing without cache store");
            Ok(false)
        }
    }

    /// One connect attempt: fresh handle, bounded liveness probe.
    async fn probe_fresh_handle(&self) -> Result<C::Handle> {
        let handle = self.inner.connector.connect().await?;
        match timeout(CONNECT_PROBE_TIMEOUT, handle.ping()).await {
            Ok(Ok(())) => Ok(handle),
            Ok(Err(err)) => {
                let _ = handle.close().await;
                Err(err)
            }
            Err(_) => {
                let _ = handle.close().await;
                Err(CacheError::Timeout)
            }
        }
    }

    /// Register a monitor task if none is running.
    ///
    /// `replace` forces a fresh task: used when the caller is the failing
    /// monitor itself, which is still "running" but about to exit.
    fn ensure_monitor(&self, lifecycle: &mut Lifecycle, replace: bool) {
        let running = lifecycle
            .monitor
            .as_ref()
            .is_some_and(|task| !task.is_finished());
        if running && !replace {
            return;
        }
        lifecycle.monitor = Some(monitor::spawn(self.clone()));
    }

    /// Tear the connection down. Best-effort: never fails.
    ///
    /// Cancels the health monitor and awaits its termination before the
    /// handle is discarded, so no probe can observe a closed handle.
    /// Close errors are logged and swallowed; the manager always ends up
    /// `Disconnected`.
    pub async fn disconnect(&self) {
        let mut lifecycle = self.inner.lifecycle.lock().await;

        if let Some(task) = lifecycle.monitor.take() {
            task.abort();
            match task.await {
                Ok(()) => {}
                Err(err) if err.is_cancelled() => {}
                Err(err) => warn!(error = %err, "health monitor ended abnormally"),
            }
        }

        let handle = {
            let mut live = self.inner.live.write();
            live.state = ConnectionState::Disconnected;
            live.handle.take()
        };
        if let Some(handle) = handle {
            if let Err(err) = handle.close().await {
                warn!(error = %err, "error closing cache store handle");
            }
            info!("disconnected from cache store");
        }
    }

    /// Current connectivity state; safe from any context, never blocks on
    /// the lifecycle lock
    pub fn state(&self) -> ConnectionState {
        self.inner.live.read().state
    }

    /// Whether a probed, live handle is installed
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Clone the live handle out of the snapshot, if any
    pub(crate) fn current_handle(&self) -> Option<C::Handle> {
        self.inner.live.read().handle.clone()
    }

    /// Drop the live handle and record the loss of connectivity
    pub(crate) fn mark_disconnected(&self) {
        let mut live = self.inner.live.write();
        live.state = ConnectionState::Disconnected;
        live.handle = None;
    }
}
