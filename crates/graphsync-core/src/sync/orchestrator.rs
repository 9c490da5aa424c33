//! Owns the stream workers and dispatches passes.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{PassOutcome, StreamWorker, SyncQueue};
use crate::error::{SyncError, SyncResult};
use crate::source::ConnectionState;
use crate::stream::StreamKind;

/// Point-in-time view of one stream.
#[derive(Debug, Clone, Serialize)]
pub struct StreamStatus {
    pub stream: StreamKind,
    pub watermark: NaiveDateTime,
    pub source: String,
    pub connection: ConnectionState,
}

/// Entry point used by the trigger surface and the CLI.
pub struct Orchestrator {
    workers: Arc<Vec<Arc<StreamWorker>>>,
    queue: SyncQueue,
}

impl Orchestrator {
    /// Register workers and start the job queue.
    pub fn new(workers: Vec<StreamWorker>, queue_capacity: usize) -> Self {
        let workers: Arc<Vec<Arc<StreamWorker>>> =
            Arc::new(workers.into_iter().map(Arc::new).collect());
        let queue = SyncQueue::start(workers.clone(), queue_capacity);
        info!(streams = workers.len(), "Sync orchestrator started");
        Self { workers, queue }
    }

    /// Registered streams, in registration order.
    pub fn streams(&self) -> Vec<StreamKind> {
        self.workers.iter().map(|w| w.stream()).collect()
    }

    pub fn worker(&self, stream: StreamKind) -> Option<&Arc<StreamWorker>> {
        self.workers.iter().find(|w| w.stream() == stream)
    }

    /// Queue one pass of `stream`; returns as soon as it is queued.
    pub async fn sync_one(&self, stream: StreamKind) -> SyncResult<Uuid> {
        if self.worker(stream).is_none() {
            return Err(SyncError::UnknownStream(stream.to_string()));
        }
        self.queue.enqueue(stream).await
    }

    /// Queue one independent pass per registered stream.
    pub async fn sync_all(&self) -> SyncResult<Vec<Uuid>> {
        let mut jobs = Vec::with_capacity(self.workers.len());
        for worker in self.workers.iter() {
            jobs.push(self.queue.enqueue(worker.stream()).await?);
        }
        Ok(jobs)
    }

    /// Run one pass of `stream` inline, bypassing the queue.
    pub async fn run_now(&self, stream: StreamKind) -> SyncResult<PassOutcome> {
        let worker = self
            .worker(stream)
            .ok_or_else(|| SyncError::UnknownStream(stream.to_string()))?;
        Ok(worker.sync().await)
    }

    pub async fn status(&self) -> Vec<StreamStatus> {
        let mut statuses = Vec::with_capacity(self.workers.len());
        for worker in self.workers.iter() {
            statuses.push(StreamStatus {
                stream: worker.stream(),
                watermark: worker.watermark().await.value,
                source: worker.connections().name().to_string(),
                connection: worker.connections().state().await,
            });
        }
        statuses
    }

    /// Stop accepting triggers and let queued passes finish.
    pub async fn shutdown(&self) {
        info!("Shutting down sync orchestrator");
        self.queue.shutdown().await;
    }
}
