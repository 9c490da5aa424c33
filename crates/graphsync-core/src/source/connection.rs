//! Lazily (re)established source connections.
//!
//! A manager is either connected or disconnected. It connects once at
//! startup and again on demand whenever a caller finds the connection absent
//! or closed. Callers that hit a data-access error call
//! [`ConnectionManager::invalidate`] so the next use reconnects. There is no
//! retry loop: one attempt per use-site, the next triggered pass tries again.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::{SourceClient, SourceConnector};
use crate::error::{SyncError, SyncResult};

/// Connection state of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connected => f.write_str("connected"),
        }
    }
}

/// Owns the process-wide connection to one relational source.
pub struct ConnectionManager {
    name: String,
    connector: Arc<dyn SourceConnector>,
    current: Mutex<Option<Arc<dyn SourceClient>>>,
}

impl ConnectionManager {
    pub fn new(name: impl Into<String>, connector: Arc<dyn SourceConnector>) -> Self {
        Self {
            name: name.into(),
            connector,
            current: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Startup connect. Failure is logged and left for the first `get`.
    pub async fn connect(&self) {
        if let Err(e) = self.get().await {
            error!(source = %self.name, error = %e, "Initial connection failed");
        }
    }

    /// Return the live connection, reconnecting once if absent or closed.
    pub async fn get(&self) -> SyncResult<Arc<dyn SourceClient>> {
        let mut current = self.current.lock().await;
        if let Some(client) = current.as_ref() {
            if !client.is_closed() {
                return Ok(client.clone());
            }
            warn!(source = %self.name, "Connection closed, reconnecting");
        }

        info!(source = %self.name, "Connecting to source");
        let client = self
            .connector
            .connect()
            .await
            .map_err(|e| SyncError::connection(&self.name, e))?;
        *current = Some(client.clone());
        info!(source = %self.name, "Source connected");
        Ok(client)
    }

    /// Drop the current connection so the next `get` reconnects.
    pub async fn invalidate(&self) {
        if self.current.lock().await.take().is_some() {
            warn!(source = %self.name, "Connection marked dead");
        }
    }

    pub async fn state(&self) -> ConnectionState {
        match self.current.lock().await.as_ref() {
            Some(client) if !client.is_closed() => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryConnector, MemorySource};

    fn manager(source: &Arc<MemorySource>) -> (Arc<MemoryConnector>, ConnectionManager) {
        let connector = Arc::new(MemoryConnector::new(source.clone()));
        let manager = ConnectionManager::new("gateway", connector.clone());
        (connector, manager)
    }

    #[tokio::test]
    async fn test_get_connects_lazily_and_reuses() {
        let source = Arc::new(MemorySource::default());
        let (connector, manager) = manager(&source);
        assert_eq!(manager.state().await, ConnectionState::Disconnected);

        manager.get().await.unwrap();
        manager.get().await.unwrap();
        assert_eq!(connector.connects(), 1);
        assert_eq!(manager.state().await, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reconnect() {
        let source = Arc::new(MemorySource::default());
        let (connector, manager) = manager(&source);

        manager.get().await.unwrap();
        manager.invalidate().await;
        assert_eq!(manager.state().await, ConnectionState::Disconnected);

        manager.get().await.unwrap();
        assert_eq!(connector.connects(), 2);
    }

    #[tokio::test]
    async fn test_closed_connection_is_replaced() {
        let source = Arc::new(MemorySource::default());
        let (connector, manager) = manager(&source);

        manager.get().await.unwrap();
        source.close();
        assert_eq!(manager.state().await, ConnectionState::Disconnected);

        manager.get().await.unwrap();
        assert_eq!(connector.connects(), 2);
    }

    #[tokio::test]
    async fn test_failed_connect_is_single_attempt() {
        let source = Arc::new(MemorySource::default());
        let (connector, manager) = manager(&source);
        connector.set_refusing(true);

        let err = manager.get().await.err().expect("connect should fail");
        assert!(matches!(err, SyncError::Connection { ref name, .. } if name == "gateway"));
        assert_eq!(connector.attempts(), 1);

        // Startup connect never panics or raises.
        manager.connect().await;
        assert_eq!(manager.state().await, ConnectionState::Disconnected);
    }
}
