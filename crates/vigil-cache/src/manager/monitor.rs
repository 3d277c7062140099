//! Background health monitor

use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace, warn};

use vigil_cache_core::{StoreConnector, StoreHandle};

use super::{CacheManager, HEALTH_PROBE_TIMEOUT};

/// Spawn the monitor loop for `manager`
pub(crate) fn spawn<C: StoreConnector>(manager: CacheManager<C>) -> JoinHandle<()> {
    tokio::spawn(run(manager))
}

/// Probe the connection at the configured interval while it stays up.
///
/// On a failed or timed-out probe: mark the manager disconnected, attempt
/// one non-required reconnect (which registers a fresh monitor on
/// success), and exit. Cancellation by `disconnect` stops the loop at the
/// next await point without touching connection state.
async fn run<C: StoreConnector>(manager: CacheManager<C>) {
    let interval = manager.inner.config.health_check_interval;
    debug!(interval_secs = interval.as_secs(), "health monitor started");

    loop {
        sleep(interval).await;

        if !manager.is_connected() {
            break;
        }
        let Some(handle) = manager.current_handle() else {
            break;
        };

        let failure = match timeout(HEALTH_PROBE_TIMEOUT, handle.ping()).await {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(_) => Some("health probe timed out".to_string()),
        };

        match failure {
            None => trace!("health probe ok"),
            Some(reason) => {
                warn!(error = %reason, "health probe failed; attempting reconnect");
                manager.mark_disconnected();
                let _ = manager.connect_inner(false, true).await;
                break;
            }
        }
    }

    debug!("health monitor stopped");
}
