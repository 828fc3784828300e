//! Candidate Store Module
//!
//! Durable pool of candidate passphrases backed by a single SQLite file.
//! Every mutation is a short transaction on one shared connection, which makes
//! the store the single point of serialization for the whole coordinator:
//! two concurrent batch reservations can never hand out the same row.
//!
//! ## Submodules
//! - **`types`**: Candidate status codes, row type, aggregate counts, clock helpers.
//! - **`records`**: The `CandidateStore` itself (schema, reservation, terminal updates,
//!   stale-lease reclamation).

pub mod records;
pub mod types;
