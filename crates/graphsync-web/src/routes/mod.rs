//! Route handlers.

pub mod health;
pub mod sync;
