//! One pass of one stream.
//!
//! Pass algorithm:
//! 1. get a live source connection
//! 2. read the watermark
//! 3. fetch rows strictly newer than it, ascending, bounded by the batch size
//! 4. merge every row into the graph, in order, stopping at the first error
//! 5. move the watermark to the last row's timestamp
//!
//! An error anywhere before step 5 leaves the watermark untouched and marks
//! the connection dead. The next pass re-reads from the same watermark, so
//! an already merged prefix is merged again; merges are idempotent.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, error, info};

use super::PassOutcome;
use crate::checkpoint::{Checkpoints, Watermark};
use crate::error::SyncResult;
use crate::graph::GraphSink;
use crate::source::ConnectionManager;
use crate::stream::model::SourceRecord;
use crate::stream::StreamKind;

/// Replicates one stream from its source into the graph.
pub struct StreamWorker {
    stream: StreamKind,
    connections: Arc<ConnectionManager>,
    checkpoints: Checkpoints,
    graph: Arc<dyn GraphSink>,
    batch_size: i64,
}

impl StreamWorker {
    pub fn new(
        stream: StreamKind,
        connections: Arc<ConnectionManager>,
        checkpoints: Checkpoints,
        graph: Arc<dyn GraphSink>,
        batch_size: i64,
    ) -> Self {
        Self {
            stream,
            connections,
            checkpoints,
            graph,
            batch_size,
        }
    }

    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// Current watermark of this stream.
    pub async fn watermark(&self) -> Watermark {
        self.checkpoints.get(self.stream).await
    }

    /// Run one pass. Never fails; errors are logged and reported in the outcome.
    pub async fn sync(&self) -> PassOutcome {
        match self.run_pass().await {
            Ok(None) => {
                debug!(stream = %self.stream, "No new records");
                PassOutcome::Idle
            }
            Ok(Some((records, watermark))) => {
                info!(stream = %self.stream, records, watermark = %watermark.value, "Stream synced");
                PassOutcome::Synced {
                    records,
                    watermark: watermark.value,
                }
            }
            Err(e) => {
                error!(stream = %self.stream, source = %self.connections.name(), error = %e, "Stream sync failed");
                self.connections.invalidate().await;
                PassOutcome::Aborted {
                    error: e.to_string(),
                }
            }
        }
    }

    /// `Ok(None)` for an empty batch, else the merged count and the new watermark.
    async fn run_pass(&self) -> SyncResult<Option<(usize, Watermark)>> {
        let client = self.connections.get().await?;
        let current = self.checkpoints.get(self.stream).await;
        let after = current.value;

        let merged = match self.stream {
            StreamKind::Users => {
                let batch = client.fetch_users(after, self.batch_size).await?;
                info!(stream = %self.stream, records = batch.len(), "Syncing new users");
                for user in &batch {
                    self.graph.merge_user(user).await?;
                    debug!(user_id = %user.user_id, "Merged user");
                }
                batch_end(&batch)
            }
            StreamKind::Devices => {
                let batch = client.fetch_devices(after, self.batch_size).await?;
                info!(stream = %self.stream, records = batch.len(), "Syncing new devices");
                for device in &batch {
                    self.graph.merge_device(device).await?;
                    debug!(device_id = %device.device_id, user_id = %device.user_id, "Merged device");
                }
                batch_end(&batch)
            }
            StreamKind::Transactions => {
                let batch = client.fetch_transactions(after, self.batch_size).await?;
                info!(stream = %self.stream, records = batch.len(), "Syncing new transactions");
                for txn in &batch {
                    self.graph.merge_transfer(txn).await?;
                    debug!(txn_id = %txn.global_txn_id, "Merged transfer");
                }
                batch_end(&batch)
            }
        };

        let Some((records, last)) = merged else {
            return Ok(None);
        };

        let next = Watermark::new(self.stream, last.max(after));
        self.checkpoints.set(&next).await;
        Ok(Some((records, next)))
    }
}

/// Row count and the timestamp of the last row of an ascending batch.
fn batch_end<R: SourceRecord>(batch: &[R]) -> Option<(usize, NaiveDateTime)> {
    batch.last().map(|last| (batch.len(), last.created_at()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{epoch, CheckpointBackend};
    use crate::testing::*;

    struct Fixture {
        source: Arc<MemorySource>,
        connector: Arc<MemoryConnector>,
        checkpoints: Arc<MemoryCheckpoints>,
        graph: Arc<MemoryGraph>,
    }

    impl Fixture {
        fn new() -> Self {
            let source = Arc::new(MemorySource::default());
            Self {
                connector: Arc::new(MemoryConnector::new(source.clone())),
                source,
                checkpoints: Arc::new(MemoryCheckpoints::default()),
                graph: Arc::new(MemoryGraph::default()),
            }
        }

        fn worker(&self, stream: StreamKind) -> StreamWorker {
            let manager = Arc::new(ConnectionManager::new(
                stream.source().as_str(),
                self.connector.clone(),
            ));
            StreamWorker::new(
                stream,
                manager,
                Checkpoints::new(self.checkpoints.clone(), "sync"),
                self.graph.clone(),
                1000,
            )
        }
    }

    #[tokio::test]
    async fn test_first_pass_starts_at_epoch() {
        let fx = Fixture::new();
        fx.source.add_users((1..=3).map(user));
        let worker = fx.worker(StreamKind::Users);

        let outcome = worker.sync().await;

        assert_eq!(fx.source.lower_bounds(), vec![epoch()]);
        assert_eq!(
            outcome,
            PassOutcome::Synced {
                records: 3,
                watermark: ts(3)
            }
        );
    }

    #[tokio::test]
    async fn test_empty_batch_has_no_side_effects() {
        let fx = Fixture::new();
        let worker = fx.worker(StreamKind::Transactions);

        assert_eq!(worker.sync().await, PassOutcome::Idle);
        assert_eq!(fx.graph.mutations(), 0);
        assert_eq!(fx.checkpoints.writes(), 0);
    }

    #[tokio::test]
    async fn test_watermark_is_max_created_at() {
        let fx = Fixture::new();
        // Inserted out of order; the pass must still land on the newest.
        fx.source.add_users([user(30), user(10), user(20)]);
        let worker = fx.worker(StreamKind::Users);

        worker.sync().await;

        assert_eq!(worker.watermark().await.value, ts(30));
        assert_eq!(
            fx.checkpoints.value("sync:last_user_time").as_deref(),
            Some("2023-01-01 00:00:30")
        );
    }

    #[tokio::test]
    async fn test_watermark_never_decreases() {
        let fx = Fixture::new();
        let worker = fx.worker(StreamKind::Users);
        let mut previous = worker.watermark().await.value;

        for round in 0..4 {
            fx.source.add_users((round * 10 + 1..=round * 10 + 5).map(user));
            worker.sync().await;
            let now = worker.watermark().await.value;
            assert!(now >= previous);
            previous = now;
        }
        assert_eq!(previous, ts(35));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_watermark() {
        let fx = Fixture::new();
        fx.source.add_users((1..=5).map(user));
        let worker = fx.worker(StreamKind::Users);
        fx.checkpoints
            .store("sync:last_user_time", "2023-01-01 00:00:00")
            .await
            .unwrap();
        fx.graph.fail_at(2);

        let outcome = worker.sync().await;

        assert!(outcome.is_aborted());
        assert_eq!(worker.watermark().await.value, epoch());
        // Records 4 and 5 were never attempted.
        assert_eq!(fx.graph.mutations(), 3);
        assert_eq!(fx.checkpoints.writes(), 1);
    }

    #[tokio::test]
    async fn test_failed_batch_is_retried_next_pass() {
        let fx = Fixture::new();
        fx.source.add_transactions((1..=4).map(|n| txn(n, "SUCCESS")));
        let worker = fx.worker(StreamKind::Transactions);
        fx.graph.fail_at(3);

        assert!(worker.sync().await.is_aborted());
        fx.graph.clear_failure();

        let outcome = worker.sync().await;
        assert_eq!(
            outcome,
            PassOutcome::Synced {
                records: 4,
                watermark: ts(4)
            }
        );
        assert_eq!(fx.source.lower_bounds(), vec![epoch(), epoch()]);
        assert_eq!(fx.graph.snapshot().transfers.len(), 4);
    }

    #[tokio::test]
    async fn test_batch_cap() {
        let fx = Fixture::new();
        fx.source.add_users((1..=1500).map(user));
        let worker = fx.worker(StreamKind::Users);

        assert_eq!(
            worker.sync().await,
            PassOutcome::Synced {
                records: 1000,
                watermark: ts(1000)
            }
        );
        assert!(fx.graph.node(&user_key("1000")).is_some());
        assert!(fx.graph.node(&user_key("1001")).is_none());

        assert_eq!(
            worker.sync().await,
            PassOutcome::Synced {
                records: 500,
                watermark: ts(1500)
            }
        );
        assert_eq!(worker.sync().await, PassOutcome::Idle);
    }

    #[tokio::test]
    async fn test_only_successful_transactions_are_merged() {
        let fx = Fixture::new();
        fx.source.add_transactions([
            txn(1, "SUCCESS"),
            txn(2, "FAILED"),
            txn(3, "PENDING"),
            txn(4, "SUCCESS"),
        ]);
        let worker = fx.worker(StreamKind::Transactions);

        worker.sync().await;

        let transfers = fx.graph.snapshot().transfers;
        assert_eq!(transfers.len(), 2);
        assert!(transfers.contains_key("TXN000001"));
        assert!(transfers.contains_key("TXN000004"));
        assert!(!transfers.contains_key("TXN000002"));
    }

    #[tokio::test]
    async fn test_reapplying_a_batch_is_idempotent() {
        let fx = Fixture::new();
        fx.source.add_users((1..=10).map(user));
        fx.source.add_devices((1..=10).map(|n| device(n, n % 3 + 1)));
        fx.source
            .add_transactions((1..=10).map(|n| txn(n, "SUCCESS")));

        for stream in StreamKind::ALL {
            fx.worker(stream).sync().await;
        }
        let once = fx.graph.snapshot();

        // Rewind every checkpoint and apply the same batches again.
        for stream in StreamKind::ALL {
            let key = format!("sync:{}", stream.checkpoint_field());
            fx.checkpoints.insert(&key, "2023-01-01 00:00:00");
            fx.worker(stream).sync().await;
        }

        assert_eq!(fx.graph.snapshot(), once);
        assert_eq!(once.nodes.keys().filter(|k| k.1 == "userId").count(), 10);
    }

    #[tokio::test]
    async fn test_user_merge_sets_payment_handle() {
        let fx = Fixture::new();
        fx.source.add_users([user(7)]);
        fx.worker(StreamKind::Users).sync().await;

        let props = fx.graph.node(&user_key("7")).unwrap();
        assert_eq!(props["vpa"], "9990000007@upibank");
        assert_eq!(props["kyc"], "VERIFIED");
    }

    #[tokio::test]
    async fn test_device_merge_links_owner_and_sets_properties() {
        let fx = Fixture::new();
        fx.source.add_devices([device(4, 2)]);
        fx.worker(StreamKind::Devices).sync().await;

        let props = fx.graph.node(&device_key("dev-4")).unwrap();
        assert_eq!(props["model"], "Pixel 8");
        assert_eq!(props["os"], "Android 14");
        assert_eq!(props["trusted"], "true");
        assert_eq!(props["lastLoginIp"], "10.0.0.1");
        assert_eq!(props["firstSeenAt"], ts(4).to_string());
        assert!(fx
            .graph
            .snapshot()
            .device_links
            .contains(&(user_key("2"), device_key("dev-4"))));
    }

    #[tokio::test]
    async fn test_query_error_marks_connection_dead() {
        let fx = Fixture::new();
        fx.source.add_users([user(1)]);
        let worker = fx.worker(StreamKind::Users);
        fx.source.set_failing(true);

        assert!(worker.sync().await.is_aborted());
        assert_eq!(fx.connector.connects(), 1);

        fx.source.set_failing(false);
        assert!(matches!(worker.sync().await, PassOutcome::Synced { .. }));
        assert_eq!(fx.connector.connects(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_source_aborts_without_query() {
        let fx = Fixture::new();
        fx.source.add_users([user(1)]);
        fx.connector.set_refusing(true);
        let worker = fx.worker(StreamKind::Users);

        assert!(worker.sync().await.is_aborted());
        assert_eq!(fx.source.fetches(), 0);
        assert_eq!(fx.checkpoints.writes(), 0);
    }

    #[tokio::test]
    async fn test_checkpoint_outage_reprocesses_from_epoch() {
        let fx = Fixture::new();
        fx.source.add_users((1..=3).map(user));
        let worker = fx.worker(StreamKind::Users);
        fx.checkpoints.set_failing(true);

        assert!(matches!(worker.sync().await, PassOutcome::Synced { records: 3, .. }));
        assert!(matches!(worker.sync().await, PassOutcome::Synced { records: 3, .. }));
        assert_eq!(fx.source.lower_bounds(), vec![epoch(), epoch()]);
        assert_eq!(fx.graph.snapshot().nodes.len(), 3);
    }
}
