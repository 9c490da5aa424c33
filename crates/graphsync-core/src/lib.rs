//! # graphsync core
//!
//! Incremental sync engine that replicates newly created relational rows
//! into a graph store.
//!
//! Each stream keeps a watermark (the `created_at` of the last record known
//! to be merged into the graph). A pass reads rows strictly newer than the
//! watermark, merges them one by one, and advances the watermark only after
//! the whole batch succeeded. Graph mutations are merge-by-key upserts, so
//! re-applying a batch after a failure is safe.

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod graph;
pub mod source;
pub mod stream;
pub mod sync;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use checkpoint::{CheckpointBackend, Checkpoints, Watermark, DEFAULT_EPOCH};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use graph::GraphSink;
pub use source::{ConnectionManager, ConnectionState, SourceClient, SourceConnector};
pub use stream::model::{DeviceRecord, SourceRecord, TransactionRecord, UserRecord};
pub use stream::{SourceId, StreamKind};
pub use sync::{Orchestrator, PassOutcome, StreamWorker, SyncQueue};
