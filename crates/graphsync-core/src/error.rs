//! Centralized error types for the sync engine.

use std::fmt::Display;

use thiserror::Error;

/// Main error type for sync operations.
///
/// Adapter crates (Postgres, Neo4j, Redis) map their driver errors into one
/// of these variants at the trait boundary.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Connection to '{name}' failed: {message}")]
    Connection { name: String, message: String },

    #[error("Source query failed: {0}")]
    Query(String),

    #[error("Graph mutation failed: {0}")]
    Graph(String),

    #[error("Checkpoint store error: {0}")]
    Checkpoint(String),

    #[error("Invalid watermark value: {0}")]
    InvalidWatermark(String),

    #[error("Unknown stream: {0}")]
    UnknownStream(String),

    #[error("Sync queue is closed")]
    QueueClosed,
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// Create a connection error for the named source.
    pub fn connection(name: impl Into<String>, err: impl Display) -> Self {
        Self::Connection {
            name: name.into(),
            message: err.to_string(),
        }
    }

    /// Create a source query error.
    pub fn query(err: impl Display) -> Self {
        Self::Query(err.to_string())
    }

    /// Create a graph mutation error.
    pub fn graph(err: impl Display) -> Self {
        Self::Graph(err.to_string())
    }

    /// Create a checkpoint store error.
    pub fn checkpoint(err: impl Display) -> Self {
        Self::Checkpoint(err.to_string())
    }
}
