//! Watermark persistence in Redis.

use async_trait::async_trait;
use graphsync_core::{CheckpointBackend, SyncError, SyncResult};
use redis::AsyncCommands;

use crate::client::LazyPool;

/// [`CheckpointBackend`] storing each key as a Redis string.
pub struct RedisCheckpoints {
    pool: LazyPool,
}

impl RedisCheckpoints {
    pub fn new(pool: LazyPool) -> Self {
        Self { pool }
    }

    /// Open a lazily connected store for `redis_url`.
    pub fn open(redis_url: &str) -> SyncResult<Self> {
        LazyPool::open(redis_url)
            .map(Self::new)
            .map_err(SyncError::checkpoint)
    }
}

#[async_trait]
impl CheckpointBackend for RedisCheckpoints {
    async fn load(&self, key: &str) -> SyncResult<Option<String>> {
        let mut conn = self.pool.get().await.map_err(SyncError::checkpoint)?;
        let value: Option<String> = conn.get(key).await.map_err(SyncError::checkpoint)?;
        Ok(value)
    }

    async fn store(&self, key: &str, value: &str) -> SyncResult<()> {
        let mut conn = self.pool.get().await.map_err(SyncError::checkpoint)?;
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(SyncError::checkpoint)?;
        Ok(())
    }
}
