//! graphsync Redis checkpoint store
//!
//! Keeps per-stream watermarks as plain string keys (`sync:last_user_time`
//! and friends) so operators can inspect or rewind them with `redis-cli`.

pub mod checkpoint;
pub mod client;

pub use checkpoint::RedisCheckpoints;
pub use client::{redis_url, LazyPool, RedisError, RedisResult};
