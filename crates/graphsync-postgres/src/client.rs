//! PostgreSQL source connections.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use graphsync_core::{
    DeviceRecord, SourceClient, SourceConnector, SyncError, SyncResult, TransactionRecord,
    UserRecord,
};
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, error};

use crate::config::SourceConfig;
use crate::queries;

/// Opens connections to one source database.
pub struct PgConnector {
    name: String,
    config: tokio_postgres::Config,
}

impl PgConnector {
    pub fn new(name: impl Into<String>, config: tokio_postgres::Config) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Connector for the gateway database (users, devices).
    pub fn gateway(config: &SourceConfig) -> Self {
        Self::new("gateway", config.pg_config(&config.gateway_db))
    }

    /// Connector for the switch database (transactions).
    pub fn switch(config: &SourceConfig) -> Self {
        Self::new("switch", config.pg_config(&config.switch_db))
    }
}

#[async_trait]
impl SourceConnector for PgConnector {
    async fn connect(&self) -> SyncResult<Arc<dyn SourceClient>> {
        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|e| SyncError::connection(&self.name, e))?;

        let name = self.name.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(source = %name, error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Arc::new(PgSourceClient {
            name: self.name.clone(),
            client,
        }))
    }
}

/// A live connection to one source database.
pub struct PgSourceClient {
    name: String,
    client: Client,
}

impl PgSourceClient {
    async fn select<T>(
        &self,
        sql: &str,
        after: NaiveDateTime,
        limit: i64,
        decode: fn(&Row) -> Result<T>,
    ) -> SyncResult<Vec<T>> {
        debug!(source = %self.name, %after, limit, "Fetching batch");
        let rows = self
            .client
            .query(sql, &[&after, &limit])
            .await
            .map_err(SyncError::query)?;
        rows.iter()
            .map(|row| decode(row).map_err(|e| SyncError::query(format!("{e:#}"))))
            .collect()
    }
}

#[async_trait]
impl SourceClient for PgSourceClient {
    fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    async fn fetch_users(&self, after: NaiveDateTime, limit: i64) -> SyncResult<Vec<UserRecord>> {
        self.select(queries::SELECT_USERS, after, limit, queries::user_from_row)
            .await
    }

    async fn fetch_devices(
        &self,
        after: NaiveDateTime,
        limit: i64,
    ) -> SyncResult<Vec<DeviceRecord>> {
        self.select(queries::SELECT_DEVICES, after, limit, queries::device_from_row)
            .await
    }

    async fn fetch_transactions(
        &self,
        after: NaiveDateTime,
        limit: i64,
    ) -> SyncResult<Vec<TransactionRecord>> {
        self.select(
            queries::SELECT_TRANSACTIONS,
            after,
            limit,
            queries::transaction_from_row,
        )
        .await
    }
}
