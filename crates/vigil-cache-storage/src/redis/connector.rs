use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection, RunError};
use bb8_redis::RedisConnectionManager;
use redis::{AsyncCommands, RedisError};

use vigil_cache_core::{
    CacheError, ManagerConfig, Result, StoreConnector, StoreHandle, StoreInfo,
};

use super::info::parse_info;

/// Batch size for SCAN cursors
const SCAN_COUNT: usize = 100;

/// Connector that builds pooled Redis handles from the manager configuration
pub struct RedisConnector {
    config: ManagerConfig,
}

impl RedisConnector {
    /// Create a new Redis connector
    pub fn new(config: ManagerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreConnector for RedisConnector {
    type Handle = RedisHandle;

    async fn connect(&self) -> Result<RedisHandle> {
        let manager = RedisConnectionManager::new(self.config.connection_url().as_str())
            .map_err(map_redis_err)?;

        let pool = Pool::builder()
            .max_size(self.config.max_connections)
            .connection_timeout(self.config.connection_timeout)
            .build(manager)
            .await
            .map_err(map_redis_err)?;

        Ok(RedisHandle { pool })
    }
}

/// Pooled handle to a Redis server
#[derive(Clone)]
pub struct RedisHandle {
    pool: Pool<RedisConnectionManager>,
}

impl RedisHandle {
    async fn conn(&self) -> Result<PooledConnection<'_, RedisConnectionManager>> {
        self.pool.get().await.map_err(|e| match e {
            RunError::User(err) => map_redis_err(err),
            RunError::TimedOut => CacheError::Timeout,
        })
    }
}

#[async_trait]
impl StoreHandle for RedisHandle {
    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING")
            .query_async::<()>(&mut *conn)
            .await
            .map_err(map_redis_err)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(map_redis_err)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn().await?;
        match ttl {
            Some(ttl) => {
                let _: () = conn
                    .set_ex(key, value, ttl.as_secs())
                    .await
                    .map_err(map_redis_err)?;
            }
            None => {
                let _: () = conn.set(key, value).await.map_err(map_redis_err)?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        let deleted: bool = conn.del(key).await.map_err(map_redis_err)?;
        Ok(deleted)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        conn.exists(key).await.map_err(map_redis_err)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn().await?;
        conn.expire(key, ttl.as_secs() as i64)
            .await
            .map_err(map_redis_err)
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.conn().await?;
        let mut keys = Vec::new();
        let mut cursor = 0u64;

        loop {
            let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .cursor_arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut *conn)
                .await
                .map_err(map_redis_err)?;

            keys.extend(batch);
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }

    async fn info(&self) -> Result<StoreInfo> {
        let mut conn = self.conn().await?;
        let raw: String = redis::cmd("INFO")
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_err)?;
        Ok(parse_info(&raw))
    }

    async fn close(&self) -> Result<()> {
        // bb8 tears the pool down when the last clone drops; there is no
        // separate close call to forward.
        Ok(())
    }
}

/// Classify a Redis driver error into the cache error taxonomy
fn map_redis_err(err: RedisError) -> CacheError {
    if err.is_timeout() {
        CacheError::Timeout
    } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        CacheError::Connection(err.to_string())
    } else {
        match err.kind() {
            redis::ErrorKind::UnexpectedReturnType
            | redis::ErrorKind::Server(redis::ServerErrorKind::ResponseError) => {
                CacheError::Protocol(err.to_string())
            }
            _ => CacheError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_maps_to_protocol() {
        let err = RedisError::from((redis::ErrorKind::UnexpectedReturnType, "WRONGTYPE"));
        assert!(matches!(map_redis_err(err), CacheError::Protocol(_)));
    }

    #[test]
    fn test_response_error_maps_to_protocol() {
        let err = RedisError::from((
            redis::ErrorKind::Server(redis::ServerErrorKind::ResponseError),
            "bad command",
        ));
        assert!(matches!(map_redis_err(err), CacheError::Protocol(_)));
    }

    #[test]
    fn test_io_error_maps_to_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = RedisError::from(io);
        let mapped = map_redis_err(err);
        assert!(mapped.is_transient(), "got {mapped:?}");
    }
}
