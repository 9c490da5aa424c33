//! Fire-and-forget job queue.
//!
//! A bounded channel drained by a single consumer task. Jobs run one after
//! another in arrival order, so two passes never overlap inside one process.
//! Enqueueing never waits. When the channel is full the job is dropped, since
//! a pass already waiting for that stream picks up the same rows. It only
//! fails once the queue has been shut down.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::StreamWorker;
use crate::error::{SyncError, SyncResult};
use crate::stream::StreamKind;

/// A queued request to run one pass of one stream.
#[derive(Debug, Clone, Copy)]
pub struct SyncJob {
    pub id: Uuid,
    pub stream: StreamKind,
}

pub struct SyncQueue {
    tx: Mutex<Option<mpsc::Sender<SyncJob>>>,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl SyncQueue {
    /// Spawn the consumer. Must be called from within a tokio runtime.
    pub fn start(workers: Arc<Vec<Arc<StreamWorker>>>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let consumer = tokio::spawn(drain(rx, workers));
        Self {
            tx: Mutex::new(Some(tx)),
            consumer: Mutex::new(Some(consumer)),
        }
    }

    /// Queue one pass of `stream` and return its job id without waiting for
    /// channel capacity.
    pub async fn enqueue(&self, stream: StreamKind) -> SyncResult<Uuid> {
        let tx = self
            .tx
            .lock()
            .await
            .clone()
            .ok_or(SyncError::QueueClosed)?;

        let job = SyncJob {
            id: Uuid::new_v4(),
            stream,
        };
        match tx.try_send(job) {
            Ok(()) => debug!(job_id = %job.id, %stream, "Sync job queued"),
            Err(TrySendError::Full(_)) => {
                warn!(job_id = %job.id, %stream, "Sync queue full, trigger dropped");
            }
            Err(TrySendError::Closed(_)) => return Err(SyncError::QueueClosed),
        }
        Ok(job.id)
    }

    /// Stop accepting jobs and wait for the queued ones to finish.
    pub async fn shutdown(&self) {
        self.tx.lock().await.take();
        if let Some(consumer) = self.consumer.lock().await.take() {
            if let Err(e) = consumer.await {
                error!(error = %e, "Sync queue consumer terminated abnormally");
            }
        }
    }
}

async fn drain(mut rx: mpsc::Receiver<SyncJob>, workers: Arc<Vec<Arc<StreamWorker>>>) {
    while let Some(job) = rx.recv().await {
        let Some(worker) = workers.iter().find(|w| w.stream() == job.stream) else {
            warn!(job_id = %job.id, stream = %job.stream, "No worker registered for stream");
            continue;
        };
        let span = info_span!("sync_job", job_id = %job.id, stream = %job.stream);
        let outcome = worker.sync().instrument(span).await;
        debug!(job_id = %job.id, ?outcome, "Sync job finished");
    }
    info!("Sync queue drained");
}
