//! # graphsync graph
//!
//! Neo4j side of the sync engine: connection client, index bootstrap, and
//! the merge statements that turn source rows into `User`/`Device` nodes and
//! `SENT_MONEY`/`USES_DEVICE` relationships.

pub mod client;
pub mod schema;
pub mod sync;

pub use client::{GraphClient, GraphConfig, GraphCounts};
pub use sync::Neo4jSink;
