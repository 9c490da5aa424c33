//! Durable per-stream watermarks.
//!
//! [`CheckpointBackend`] is the raw key-value seam and reports every failure.
//! [`Checkpoints`] sits on top of it and applies the engine's policy: reads
//! fall back to the epoch, writes are best-effort. Losing a write only makes
//! the next pass re-merge an already-merged batch.

pub mod watermark;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::error::SyncResult;
use crate::stream::StreamKind;

pub use watermark::{epoch, parse_timestamp, Watermark, DEFAULT_EPOCH};

/// String-keyed store holding checkpoint values.
#[async_trait]
pub trait CheckpointBackend: Send + Sync {
    /// Read a key. `Ok(None)` means the stream was never synced.
    async fn load(&self, key: &str) -> SyncResult<Option<String>>;

    /// Write a key.
    async fn store(&self, key: &str, value: &str) -> SyncResult<()>;
}

/// Watermark reads and writes with failures swallowed.
#[derive(Clone)]
pub struct Checkpoints {
    backend: Arc<dyn CheckpointBackend>,
    namespace: String,
}

impl Checkpoints {
    pub fn new(backend: Arc<dyn CheckpointBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    /// Namespaced key for a stream, e.g. `sync:last_txn_time`.
    pub fn key(&self, stream: StreamKind) -> String {
        format!("{}:{}", self.namespace, stream.checkpoint_field())
    }

    /// Current watermark for `stream`; the epoch if absent, unreadable or unparseable.
    pub async fn get(&self, stream: StreamKind) -> Watermark {
        let key = self.key(stream);
        match self.backend.load(&key).await {
            Ok(Some(raw)) => match Watermark::parse(stream, &raw) {
                Ok(wm) => wm,
                Err(e) => {
                    warn!(%stream, key = %key, error = %e, "Stored watermark unparseable, using epoch");
                    Watermark::epoch(stream)
                }
            },
            Ok(None) => {
                debug!(%stream, key = %key, "No watermark stored, using epoch");
                Watermark::epoch(stream)
            }
            Err(e) => {
                warn!(%stream, key = %key, error = %e, "Checkpoint store unreachable, using epoch");
                Watermark::epoch(stream)
            }
        }
    }

    /// Persist `watermark`. Failure is logged, never retried or raised.
    pub async fn set(&self, watermark: &Watermark) {
        let key = self.key(watermark.stream);
        let value = watermark.to_storage_string();
        if let Err(e) = self.backend.store(&key, &value).await {
            error!(stream = %watermark.stream, key = %key, value = %value, error = %e, "Failed to save watermark");
        } else {
            debug!(stream = %watermark.stream, key = %key, value = %value, "Watermark saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ts, MemoryCheckpoints};

    fn checkpoints(backend: &Arc<MemoryCheckpoints>) -> Checkpoints {
        Checkpoints::new(backend.clone(), "sync")
    }

    #[test]
    fn test_keys_are_namespaced() {
        let cp = checkpoints(&Arc::new(MemoryCheckpoints::default()));
        assert_eq!(cp.key(StreamKind::Users), "sync:last_user_time");
        assert_eq!(cp.key(StreamKind::Transactions), "sync:last_txn_time");
        assert_eq!(cp.key(StreamKind::Devices), "sync:last_device_time");
    }

    #[tokio::test]
    async fn test_absent_key_yields_epoch() {
        let cp = checkpoints(&Arc::new(MemoryCheckpoints::default()));
        assert_eq!(cp.get(StreamKind::Users).await, Watermark::epoch(StreamKind::Users));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let backend = Arc::new(MemoryCheckpoints::default());
        let cp = checkpoints(&backend);
        let wm = Watermark::new(StreamKind::Transactions, ts(42));
        cp.set(&wm).await;
        assert_eq!(cp.get(StreamKind::Transactions).await, wm);
        assert_eq!(backend.writes(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_swallowed() {
        let backend = Arc::new(MemoryCheckpoints::default());
        let cp = checkpoints(&backend);
        cp.set(&Watermark::new(StreamKind::Users, ts(10))).await;

        backend.set_failing(true);
        assert_eq!(cp.get(StreamKind::Users).await, Watermark::epoch(StreamKind::Users));
        cp.set(&Watermark::new(StreamKind::Users, ts(20))).await;

        backend.set_failing(false);
        assert_eq!(cp.get(StreamKind::Users).await.value, ts(10));
    }

    #[tokio::test]
    async fn test_garbage_value_yields_epoch() {
        let backend = Arc::new(MemoryCheckpoints::default());
        backend.insert("sync:last_user_time", "not-a-time");
        let cp = checkpoints(&backend);
        assert_eq!(cp.get(StreamKind::Users).await, Watermark::epoch(StreamKind::Users));
    }
}
