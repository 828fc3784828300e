//! The terminal latch: once any worker validates a candidate, the whole
//! cluster is done. The flag must survive restarts, so it is backed by a
//! marker file; the file doubles as a human-readable audit trail with one
//! stanza appended per confirmation (intentionally never deduplicated).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::Result;

use crate::store::types::now_secs;

pub const MARKER_FILE: &str = "PASSWORD_FOUND.txt";

pub struct FoundLatch {
    found: AtomicBool,
    marker_path: PathBuf,
    // Serializes appends and the backup rename.
    file_lock: Mutex<()>,
}

impl FoundLatch {
    /// Loads the latch at startup; the marker file's presence is the flag.
    pub fn load(marker_path: impl Into<PathBuf>) -> Self {
        let marker_path = marker_path.into();
        let found = marker_path.exists();
        if found {
            tracing::warn!(
                "Found-marker {} already present; refusing to issue new work",
                marker_path.display()
            );
        }
        Self {
            found: AtomicBool::new(found),
            marker_path,
            file_lock: Mutex::new(()),
        }
    }

    pub fn is_set(&self) -> bool {
        self.found.load(Ordering::SeqCst)
    }

    /// Appends a confirmation stanza and flips the in-memory bit. The append
    /// is flushed to disk before this returns, so the caller can acknowledge
    /// the worker knowing the latch survives a crash.
    pub fn set(&self, password: &str, client_id: &str) -> Result<()> {
        let _guard = self
            .file_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("latch file mutex poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.marker_path)?;
        writeln!(
            file,
            "--- confirmed_at={} client={}\npassword={}",
            now_secs(),
            client_id,
            password
        )?;
        file.sync_all()?;
        self.found.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Sample-store reset: the marker is moved aside to a timestamped backup
    /// (the audit trail is never destroyed) and the bit clears.
    pub fn clear_with_backup(&self) -> Result<Option<PathBuf>> {
        let _guard = self
            .file_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("latch file mutex poisoned"))?;
        let backup = if self.marker_path.exists() {
            let backup = backup_path(&self.marker_path);
            std::fs::rename(&self.marker_path, &backup)?;
            Some(backup)
        } else {
            None
        };
        self.found.store(false, Ordering::SeqCst);
        Ok(backup)
    }

    pub fn marker_path(&self) -> &Path {
        &self.marker_path
    }
}

fn backup_path(marker: &Path) -> PathBuf {
    let mut name = marker.as_os_str().to_os_string();
    name.push(format!(".{}.bak", now_secs()));
    PathBuf::from(name)
}
