//! Adaptive memoization of the aggregate progress counts.
//!
//! A full-table scan is cheap on a toy pool and brutal on a hundred-million
//! row one, so the cache TTL scales with the pool's cardinality: small pools
//! always recompute, huge ones serve snapshots for up to an hour. At most one
//! recomputation runs at a time; a read that lands mid-recomputation gets the
//! previous snapshot, or an "updating" signal if there is none yet. Reads
//! never queue behind the scan.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;

use crate::store::records::CandidateStore;
use crate::store::types::{now_ms, StatusCounts};

#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub counts: StatusCounts,
    pub progress: String,
    pub computed_at_ms: u64,
}

#[derive(Default)]
struct CacheState {
    snapshot: Option<StatsSnapshot>,
    updating: bool,
}

#[derive(Default)]
pub struct StatsCache {
    state: Mutex<CacheState>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot, recomputing if the cached one expired. `Ok(None)`
    /// means a recomputation is in flight and no previous snapshot exists
    /// ("updating"); the caller should retry shortly.
    pub fn read(&self, store: &CandidateStore) -> Result<Option<StatsSnapshot>> {
        {
            let mut state = self
                .state
                .lock()
                .map_err(|_| anyhow::anyhow!("stats cache mutex poisoned"))?;
            if let Some(snapshot) = &state.snapshot {
                if !expired(snapshot) {
                    return Ok(Some(snapshot.clone()));
                }
            }
            if state.updating {
                // Stale-but-present beats blocking the caller.
                return Ok(state.snapshot.clone());
            }
            state.updating = true;
        }

        // Scan without holding the cache lock.
        let computed = compute(store);

        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("stats cache mutex poisoned"))?;
        state.updating = false;
        match computed {
            Ok(snapshot) => {
                state.snapshot = Some(snapshot.clone());
                Ok(Some(snapshot))
            }
            Err(e) => Err(e),
        }
    }
}

fn compute(store: &CandidateStore) -> Result<StatsSnapshot> {
    let counts = store.count_by_status()?;
    Ok(StatsSnapshot {
        progress: counts.progress(),
        counts,
        computed_at_ms: now_ms(),
    })
}

fn expired(snapshot: &StatsSnapshot) -> bool {
    let ttl = ttl_for(snapshot.counts.total);
    let age = Duration::from_millis(now_ms().saturating_sub(snapshot.computed_at_ms));
    age >= ttl
}

/// TTL by pool cardinality: up to 10k rows, always recompute; above that,
/// one minute per million rows, capped at an hour.
pub fn ttl_for(total: u64) -> Duration {
    if total <= 10_000 {
        return Duration::ZERO;
    }
    let minutes = (total / 1_000_000).min(60);
    Duration::from_secs(minutes * 60)
}
