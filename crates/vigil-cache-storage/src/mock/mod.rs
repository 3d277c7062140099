//! Scripted in-memory store for tests
//!
//! Implements the store traits against a shared map with TTL support, and
//! lets tests script failures precisely: connect-construction errors, a
//! run of failing liveness probes, injected per-operation faults, and a
//! failing close. Counters expose how often the store was touched.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use vigil_cache_core::{CacheError, Result, StoreConnector, StoreHandle, StoreInfo};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

#[derive(Default)]
struct MockState {
    data: Mutex<HashMap<String, Entry>>,
    connect_faults: Mutex<VecDeque<CacheError>>,
    ping_failures: Mutex<u32>,
    op_faults: Mutex<VecDeque<CacheError>>,
    close_faults: Mutex<VecDeque<CacheError>>,
    info: Mutex<StoreInfo>,
    connect_attempts: AtomicU32,
    pings: AtomicU32,
    data_ops: AtomicU32,
    closes: AtomicU32,
}

/// Shared in-memory store with scriptable failures
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<MockState>,
}

impl MockStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a connector producing handles onto this store
    pub fn connector(&self) -> MockConnector {
        MockConnector {
            store: self.clone(),
            connect_delay: None,
        }
    }

    /// Script the next handle construction to fail with `err`
    pub fn fail_next_connect(&self, err: CacheError) {
        self.state.connect_faults.lock().push_back(err);
    }

    /// Script the next `n` liveness probes to fail
    pub fn fail_next_pings(&self, n: u32) {
        *self.state.ping_failures.lock() += n;
    }

    /// Script the next data operation to fail with `err`
    ///
    /// Faults queue up; each data operation consumes at most one.
    pub fn fail_next_op(&self, err: CacheError) {
        self.state.op_faults.lock().push_back(err);
    }

    /// Script the next close to fail with `err`
    pub fn fail_next_close(&self, err: CacheError) {
        self.state.close_faults.lock().push_back(err);
    }

    /// Replace the metrics returned by the stats call
    pub fn set_info(&self, info: StoreInfo) {
        *self.state.info.lock() = info;
    }

    /// How many handles were constructed
    pub fn connect_attempts(&self) -> u32 {
        self.state.connect_attempts.load(Ordering::SeqCst)
    }

    /// How many liveness probes were issued
    pub fn pings(&self) -> u32 {
        self.state.pings.load(Ordering::SeqCst)
    }

    /// How many data operations were issued (including faulted ones)
    pub fn data_ops(&self) -> u32 {
        self.state.data_ops.load(Ordering::SeqCst)
    }

    /// How many handles were closed
    pub fn closes(&self) -> u32 {
        self.state.closes.load(Ordering::SeqCst)
    }
}

/// Connector producing [`MockHandle`]s onto a shared [`MockStore`]
#[derive(Clone)]
pub struct MockConnector {
    store: MockStore,
    connect_delay: Option<Duration>,
}

impl MockConnector {
    /// Create a connector onto `store`
    pub fn new(store: &MockStore) -> Self {
        store.connector()
    }

    /// Make each handle construction take `delay` (for overlap tests)
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }
}

#[async_trait]
impl StoreConnector for MockConnector {
    type Handle = MockHandle;

    async fn connect(&self) -> Result<MockHandle> {
        let state = &self.store.state;
        state.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = state.connect_faults.lock().pop_front() {
            return Err(err);
        }
        Ok(MockHandle {
            state: Arc::clone(state),
        })
    }
}

/// Handle onto a [`MockStore`]
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<MockState>,
}

impl MockHandle {
    fn take_op_fault(&self) -> Option<CacheError> {
        self.state.data_ops.fetch_add(1, Ordering::SeqCst);
        self.state.op_faults.lock().pop_front()
    }
}

#[async_trait]
impl StoreHandle for MockHandle {
    async fn ping(&self) -> Result<()> {
        self.state.pings.fetch_add(1, Ordering::SeqCst);
        let mut remaining = self.state.ping_failures.lock();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(CacheError::Connection("simulated probe failure".into()));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(err) = self.take_op_fault() {
            return Err(err);
        }
        let mut data = self.state.data.lock();
        match data.get(key) {
            Some(entry) if entry.expired() => {
                data.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        if let Some(err) = self.take_op_fault() {
            return Err(err);
        }
        self.state.data.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        if let Some(err) = self.take_op_fault() {
            return Err(err);
        }
        match self.state.data.lock().remove(key) {
            Some(entry) => Ok(!entry.expired()),
            None => Ok(false),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        if let Some(err) = self.take_op_fault() {
            return Err(err);
        }
        let mut data = self.state.data.lock();
        match data.get(key) {
            Some(entry) if entry.expired() => {
                data.remove(key);
                Ok(false)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        if let Some(err) = self.take_op_fault() {
            return Err(err);
        }
        let mut data = self.state.data.lock();
        match data.get_mut(key) {
            Some(entry) if !entry.expired() => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        if let Some(err) = self.take_op_fault() {
            return Err(err);
        }
        let data = self.state.data.lock();
        Ok(data
            .iter()
            .filter(|(key, entry)| !entry.expired() && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn info(&self) -> Result<StoreInfo> {
        Ok(self.state.info.lock().clone())
    }

    async fn close(&self) -> Result<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        match self.state.close_faults.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Glob matching with `*` wildcards, enough for key patterns like `session:*`
fn glob_match(pattern: &str, text: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == text;
    }

    let mut segments = pattern.split('*');
    let first = segments.next().unwrap_or("");
    if !text.starts_with(first) {
        return false;
    }
    let mut pos = first.len();

    let mut middle: Vec<&str> = segments.collect();
    let last = if pattern.ends_with('*') {
        None
    } else {
        middle.pop()
    };

    for segment in middle {
        if segment.is_empty() {
            continue;
        }
        match text[pos..].find(segment) {
            Some(found) => pos += found + segment.len(),
            None => return false,
        }
    }

    match last {
        Some(last) => text[pos..].ends_with(last),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("session:*", "session:42"));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("*:42", "session:42"));
        assert!(glob_match("s*n:*", "session:42"));
        assert!(glob_match("exact", "exact"));

        assert!(!glob_match("session:*", "user:42"));
        assert!(!glob_match("exact", "exactly"));
        assert!(!glob_match("a*b", "a"));
    }

    #[tokio::test]
    async fn test_map_semantics() {
        let store = MockStore::new();
        let handle = store.connector().connect().await.unwrap();

        assert_eq!(handle.get("k").await.unwrap(), None);
        handle.set("k", "v", None).await.unwrap();
        assert_eq!(handle.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(handle.exists("k").await.unwrap());
        assert!(handle.delete("k").await.unwrap());
        assert!(!handle.delete("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = MockStore::new();
        let handle = store.connector().connect().await.unwrap();

        handle
            .set("k", "v", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert!(handle.exists("k").await.unwrap());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(handle.get("k").await.unwrap(), None);
        assert!(!handle.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_scripted_faults_queue() {
        let store = MockStore::new();
        let handle = store.connector().connect().await.unwrap();

        store.fail_next_op(CacheError::Connection("reset".into()));
        assert!(handle.get("k").await.is_err());
        assert!(handle.get("k").await.is_ok());

        store.fail_next_pings(2);
        assert!(handle.ping().await.is_err());
        assert!(handle.ping().await.is_err());
        assert!(handle.ping().await.is_ok());
        assert_eq!(store.pings(), 3);
    }
}
