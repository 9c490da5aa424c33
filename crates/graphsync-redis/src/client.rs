//! Redis connection management.

use redis::aio::ConnectionManager;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Redis error types.
#[derive(Error, Debug)]
pub enum RedisError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Invalid Redis URL: {0}")]
    InvalidUrl(String),
}

/// Result type for Redis operations.
pub type RedisResult<T> = Result<T, RedisError>;

/// Build a connection URL from host and port, e.g. `redis://localhost:6379/0`.
pub fn redis_url(host: &str, port: u16) -> String {
    format!("redis://{host}:{port}/0")
}

/// A `ConnectionManager` created on first use.
///
/// `ConnectionManager::new` dials immediately, so creating it at startup would
/// make an unreachable Redis fatal. The manager multiplexes and reconnects on
/// its own once it exists; callers clone it per operation.
pub struct LazyPool {
    client: redis::Client,
    manager: Mutex<Option<ConnectionManager>>,
}

impl LazyPool {
    /// Validate `redis_url` without connecting.
    pub fn open(redis_url: &str) -> RedisResult<Self> {
        let client =
            redis::Client::open(redis_url).map_err(|e| RedisError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            client,
            manager: Mutex::new(None),
        })
    }

    /// Get a connection handle, dialing Redis if this is the first use.
    pub async fn get(&self) -> RedisResult<ConnectionManager> {
        let mut manager = self.manager.lock().await;
        if let Some(conn) = manager.as_ref() {
            return Ok(conn.clone());
        }
        let conn = ConnectionManager::new(self.client.clone()).await?;
        info!("Connected to Redis checkpoint store");
        *manager = Some(conn.clone());
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_url() {
        assert_eq!(redis_url("cache.internal", 6380), "redis://cache.internal:6380/0");
    }

    #[test]
    fn test_open_does_not_connect() {
        // Nothing listens on this port; opening must still succeed.
        assert!(LazyPool::open("redis://127.0.0.1:1/0").is_ok());
    }

    #[test]
    fn test_open_rejects_bad_url() {
        assert!(matches!(
            LazyPool::open("not a url"),
            Err(RedisError::InvalidUrl(_))
        ));
    }
}
