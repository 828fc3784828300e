use serde::{Deserialize, Serialize};

/// Leases older than this (seconds in CHECKING) are considered abandoned.
pub const STALE_LEASE_SECS: i64 = 3600;

/// Lifecycle of a single candidate row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CandidateStatus {
    Unchecked = 0,
    Checking = 1,
    Checked = 2,
}

impl CandidateStatus {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unchecked),
            1 => Some(Self::Checking),
            2 => Some(Self::Checked),
            _ => None,
        }
    }

    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateRecord {
    pub id: i64,
    pub pwd: String,
    pub status: i64,
    pub updated_at: i64,
}

/// Aggregate counts from a single table scan.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub uncheck: u64,
    pub checking: u64,
    pub checked: u64,
    /// CHECKING rows older than [`STALE_LEASE_SECS`].
    pub timeout: u64,
    pub total: u64,
}

impl StatusCounts {
    /// Completion percentage rendered with two decimals ("100.00").
    pub fn progress(&self) -> String {
        if self.total == 0 {
            return "0.00".to_string();
        }
        format!("{:.2}", (self.checked as f64 / self.total as f64) * 100.0)
    }
}

/// Lease batch size for a reported CPU count: one hundred candidates per core,
/// never fewer than one hundred. Nonsense CPU counts count as a single core.
pub fn lease_batch_size(cpu_count: i64) -> usize {
    let cpus = if cpu_count <= 0 { 1 } else { cpu_count as usize };
    (cpus * 100).max(100)
}

pub fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
