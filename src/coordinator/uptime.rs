//! Startup time persisted across restarts, so dashboards show cluster uptime
//! rather than process uptime.

use std::path::Path;

use crate::store::types::now_ms;

pub const STARTUP_TIME_FILE: &str = "startup_time.txt";

pub struct Uptime {
    startup_ms: u64,
}

impl Uptime {
    /// Reads the single-line epoch-millis artifact; a missing or mangled file
    /// is rewritten with the current time.
    pub fn load_or_init(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if let Ok(text) = std::fs::read_to_string(path) {
            if let Ok(startup_ms) = text.trim().parse::<u64>() {
                return Self { startup_ms };
            }
            tracing::warn!("Unparseable startup-time artifact, rewriting");
        }
        let startup_ms = now_ms();
        if let Err(e) = std::fs::write(path, startup_ms.to_string()) {
            tracing::warn!("Failed to persist startup time: {}", e);
        }
        Self { startup_ms }
    }

    pub fn startup_ms(&self) -> u64 {
        self.startup_ms
    }

    pub fn elapsed_secs(&self) -> u64 {
        now_ms().saturating_sub(self.startup_ms) / 1000
    }

    pub fn formatted(&self) -> String {
        format_uptime(self.elapsed_secs())
    }
}

/// Renders seconds as `2d 3h 4m 5s`, omitting leading zero units.
pub fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m {seconds}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
