//! Relational source seam.

pub mod connection;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::SyncResult;
use crate::stream::model::{DeviceRecord, TransactionRecord, UserRecord};

pub use connection::{ConnectionManager, ConnectionState};

/// A live connection to one relational source.
///
/// Every fetch returns rows with their watermark column strictly greater than
/// `after`, ascending by that column, at most `limit` rows. A source only
/// serves the tables it owns; asking the switch for users is a query error.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Whether the underlying connection has been closed.
    fn is_closed(&self) -> bool;

    async fn fetch_users(&self, after: NaiveDateTime, limit: i64) -> SyncResult<Vec<UserRecord>>;

    async fn fetch_devices(&self, after: NaiveDateTime, limit: i64)
        -> SyncResult<Vec<DeviceRecord>>;

    /// Only `SUCCESS` transactions are returned.
    async fn fetch_transactions(
        &self,
        after: NaiveDateTime,
        limit: i64,
    ) -> SyncResult<Vec<TransactionRecord>>;
}

/// Opens new connections to one relational source.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    async fn connect(&self) -> SyncResult<Arc<dyn SourceClient>>;
}
