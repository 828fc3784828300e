//! Coordinator State Module
//!
//! The shared mutable state the request surface leans on. Each piece is a
//! small component that owns its lock; raw references never escape.
//!
//! ## Submodules
//! - **`latch`**: The durable one-shot "password found" flag and its
//!   append-only marker file.
//! - **`liveness`**: In-memory worker last-seen registry with a one-hour
//!   sliding window.
//! - **`stats`**: Memoized aggregate progress counts with a TTL that scales
//!   with store cardinality.
//! - **`uptime`**: Startup time persisted across restarts and human-readable
//!   uptime formatting.

pub mod latch;
pub mod liveness;
pub mod stats;
pub mod uptime;

#[cfg(test)]
mod tests;
