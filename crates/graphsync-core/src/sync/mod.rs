//! Stream passes, the job queue, and the orchestrator that owns them.

pub mod orchestrator;
pub mod queue;
pub mod worker;

use chrono::NaiveDateTime;
use serde::Serialize;

pub use orchestrator::{Orchestrator, StreamStatus};
pub use queue::{SyncJob, SyncQueue};
pub use worker::StreamWorker;

/// Result of one pass of a stream worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PassOutcome {
    /// Nothing newer than the watermark.
    Idle,
    /// A batch was merged and the watermark advanced.
    Synced {
        records: usize,
        watermark: NaiveDateTime,
    },
    /// The pass stopped at an error; the watermark did not move.
    Aborted { error: String },
}

impl PassOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}
