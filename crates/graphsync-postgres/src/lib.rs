//! graphsync PostgreSQL sources
//!
//! Connects to the gateway and switch databases and runs the per-stream
//! batch selects with the watermark bound as a query parameter.

pub mod client;
pub mod config;
pub mod queries;

pub use client::{PgConnector, PgSourceClient};
pub use config::SourceConfig;
