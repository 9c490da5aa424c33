//! Merge statements applied per source record.
//!
//! Every statement is a `MERGE` keyed on a stable identifier with all values
//! bound as named parameters, so replaying a record is a no-op.

pub mod device_sync;
pub mod transaction_sync;
pub mod user_sync;

use async_trait::async_trait;
use graphsync_core::{
    DeviceRecord, GraphSink, SyncError, SyncResult, TransactionRecord, UserRecord,
};

use crate::GraphClient;

/// [`GraphSink`] over a Neo4j connection pool.
#[derive(Clone)]
pub struct Neo4jSink {
    client: GraphClient,
}

impl Neo4jSink {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GraphSink for Neo4jSink {
    async fn merge_user(&self, user: &UserRecord) -> SyncResult<()> {
        self.client
            .execute(user_sync::merge_user_query(user))
            .await
            .map_err(|e| SyncError::graph(format!("user {}: {e:#}", user.user_id)))
    }

    async fn merge_device(&self, device: &DeviceRecord) -> SyncResult<()> {
        self.client
            .execute(device_sync::merge_device_query(device))
            .await
            .map_err(|e| SyncError::graph(format!("device {}: {e:#}", device.device_id)))
    }

    async fn merge_transfer(&self, txn: &TransactionRecord) -> SyncResult<()> {
        self.client
            .execute(transaction_sync::merge_transfer_query(txn))
            .await
            .map_err(|e| SyncError::graph(format!("transaction {}: {e:#}", txn.global_txn_id)))
    }
}
