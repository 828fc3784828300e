//! Request Surface Module
//!
//! The coordinator's HTTP API. Read endpoints (records, counts, stats,
//! dashboard) are open; everything that mutates the pool requires the shared
//! secret.
//!
//! ## Submodules
//! - **`protocol`**: Wire types for every endpoint, shared with the worker
//!   crate.
//! - **`auth`**: Shared-secret check (Bearer header or dedicated token
//!   header), fail-closed when no secret is configured.
//! - **`handlers`**: The Axum handlers; they translate HTTP requests into
//!   store/latch/stats calls and never let a store failure escape as anything
//!   but a 500.

pub mod auth;
pub mod handlers;
pub mod protocol;
