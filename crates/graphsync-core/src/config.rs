//! Engine tuning knobs.

use serde::Deserialize;

/// Default number of rows fetched per pass.
pub const DEFAULT_BATCH_SIZE: i64 = 1000;

/// Default checkpoint key namespace.
pub const DEFAULT_NAMESPACE: &str = "sync";

/// Default number of pending jobs the queue holds before triggers are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Configuration shared by every stream worker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound on rows fetched and merged in one pass.
    pub batch_size: i64,
    /// Prefix for checkpoint keys, e.g. `sync` gives `sync:last_user_time`.
    pub namespace: String,
    /// Pending jobs held by the queue. Triggers arriving while it is full are
    /// dropped in favour of the passes already waiting.
    pub queue_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            namespace: DEFAULT_NAMESPACE.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
