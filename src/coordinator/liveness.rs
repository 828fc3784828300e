//! Worker liveness registry: worker id -> last-seen epoch millis.
//!
//! Purely in-memory; a restart forgets everyone and the next lease round
//! repopulates it. Entries age out of reads after one hour and are evicted
//! lazily on each read.

use dashmap::DashMap;

use crate::store::types::now_ms;

const ACTIVE_WINDOW_MS: u64 = 60 * 60 * 1000;

#[derive(Default)]
pub struct LivenessRegistry {
    clients: DashMap<String, u64>,
}

impl LivenessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&self, client_id: &str) {
        self.clients.insert(client_id.to_string(), now_ms());
    }

    /// Evicts entries outside the window and returns the sorted survivors.
    pub fn active(&self) -> Vec<String> {
        let now = now_ms();
        self.clients
            .retain(|_, last_seen| now.saturating_sub(*last_seen) <= ACTIVE_WINDOW_MS);

        let mut active: Vec<String> = self
            .clients
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        active.sort();
        active
    }
}
