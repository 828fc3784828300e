//! Distributed Wallet Passphrase Search — Coordinator Core
//!
//! This library crate defines the modules behind the coordinator binary
//! (`main.rs`) and the pieces the worker crate shares (wire protocol, wallet
//! verification).
//!
//! ## Architecture Modules
//! The system is composed of four loosely coupled subsystems:
//!
//! - **`store`**: The durable candidate pool. A single SQLite table with
//!   transactional batch reservation, terminal updates, and stale-lease
//!   reclamation; the one point of serialization in the coordinator.
//! - **`coordinator`**: Shared mutable coordinator state: the durable
//!   "password found" latch, the worker liveness registry, the adaptive
//!   stats cache, and persisted uptime.
//! - **`api`**: The HTTP request surface. Open read endpoints, token-guarded
//!   mutating endpoints, and the wire protocol shared with the worker.
//! - **`wallet`**: The encrypted wallet descriptor and the deterministic
//!   verification pipeline a worker runs on every candidate.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod store;
pub mod wallet;
