//! The candidate table and its transactional primitives.
//!
//! One rusqlite connection guarded by a mutex. All mutations run as single
//! transactions, so reservation, reclamation and terminal updates are
//! linearizable with respect to each other.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::types::{now_secs, CandidateRecord, StatusCounts, STALE_LEASE_SECS};

#[derive(Clone)]
pub struct CandidateStore {
    conn: Arc<Mutex<Connection>>,
}

impl CandidateStore {
    /// Opens an existing store file. The pool is seeded out of band by the
    /// generator tool, so a missing file is a startup error, not something to
    /// silently create.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("candidate store not found at {}", path.display()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Creates (or opens) a store file and applies the schema. Used by the
    /// seeding tool; the coordinator itself only ever calls [`open`].
    ///
    /// [`open`]: CandidateStore::open
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                pwd        TEXT UNIQUE NOT NULL,
                status     INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_status ON records(status)",
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("candidate store mutex poisoned"))
    }

    /// Idempotent batch insert. Duplicate passphrases are silently ignored;
    /// returns the number of rows actually inserted.
    pub fn insert_batch(&self, passphrases: &[String]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = now_secs();
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO records (pwd, status, updated_at) VALUES (?1, 0, ?2)",
            )?;
            for pwd in passphrases {
                inserted += stmt.execute(params![pwd, now])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Reserves up to `limit` UNCHECKED rows, lowest id first, flipping them
    /// to CHECKING inside the same transaction. The selected set is exactly
    /// the UNCHECKED rows up to the highest selected id, so a single range
    /// update covers it without a dynamic `IN (...)` list.
    pub fn reserve_batch(&self, limit: usize) -> Result<Vec<(i64, String)>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let selected = {
            let mut stmt = tx.prepare(
                "SELECT id, pwd FROM records WHERE status = 0 ORDER BY id ASC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        if let Some((max_id, _)) = selected.last() {
            tx.execute(
                "UPDATE records SET status = 1, updated_at = ?1 WHERE status = 0 AND id <= ?2",
                params![now_secs(), max_id],
            )?;
        }
        tx.commit()?;
        Ok(selected)
    }

    /// Flips the given passphrases to CHECKED. Unknown passphrases are no-ops;
    /// returns the number of rows touched.
    pub fn mark_checked(&self, passphrases: &[String]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = now_secs();
        let mut updated = 0;
        {
            let mut stmt =
                tx.prepare("UPDATE records SET status = 2, updated_at = ?1 WHERE pwd = ?2")?;
            for pwd in passphrases {
                updated += stmt.execute(params![now, pwd])?;
            }
        }
        tx.commit()?;
        Ok(updated)
    }

    /// Returns over-age CHECKING rows to the UNCHECKED pool.
    pub fn reclaim_stale(&self, age_secs: i64) -> Result<usize> {
        let conn = self.lock()?;
        let now = now_secs();
        let reclaimed = conn.execute(
            "UPDATE records SET status = 0, updated_at = ?1 WHERE status = 1 AND updated_at < ?2",
            params![now, now - age_secs],
        )?;
        Ok(reclaimed)
    }

    /// Flips every row back to UNCHECKED. The caller enforces the
    /// sample-store policy; the store does not know which file it lives in.
    pub fn reset_all(&self) -> Result<usize> {
        let conn = self.lock()?;
        let reset = conn.execute(
            "UPDATE records SET status = 0, updated_at = ?1",
            params![now_secs()],
        )?;
        Ok(reset)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Single-scan aggregation over the whole table. `timeout` additionally
    /// counts CHECKING rows older than [`STALE_LEASE_SECS`].
    pub fn count_by_status(&self) -> Result<StatusCounts> {
        let conn = self.lock()?;
        let cutoff = now_secs() - STALE_LEASE_SECS;
        let counts = conn.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(status = 0), 0),
                COALESCE(SUM(status = 1), 0),
                COALESCE(SUM(status = 2), 0),
                COALESCE(SUM(status = 1 AND updated_at < ?1), 0)
             FROM records",
            params![cutoff],
            |row| {
                Ok(StatusCounts {
                    total: row.get::<_, i64>(0)? as u64,
                    uncheck: row.get::<_, i64>(1)? as u64,
                    checking: row.get::<_, i64>(2)? as u64,
                    checked: row.get::<_, i64>(3)? as u64,
                    timeout: row.get::<_, i64>(4)? as u64,
                })
            },
        )?;
        Ok(counts)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<CandidateRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT id, pwd, status, updated_at FROM records WHERE id = ?1",
                params![id],
                Self::map_record,
            )
            .optional()?;
        Ok(record)
    }

    pub fn get_by_pwd(&self, pwd: &str) -> Result<Option<CandidateRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT id, pwd, status, updated_at FROM records WHERE pwd = ?1",
                params![pwd],
                Self::map_record,
            )
            .optional()?;
        Ok(record)
    }

    pub fn get_random(&self) -> Result<Option<CandidateRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT id, pwd, status, updated_at FROM records ORDER BY RANDOM() LIMIT 1",
                [],
                Self::map_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Test hook: backdate a row's `updated_at` so lease expiry can be
    /// exercised without sleeping for an hour.
    #[cfg(test)]
    pub fn backdate(&self, pwd: &str, updated_at: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE records SET updated_at = ?1 WHERE pwd = ?2",
            params![updated_at, pwd],
        )?;
        Ok(())
    }

    fn map_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<CandidateRecord> {
        Ok(CandidateRecord {
            id: row.get(0)?,
            pwd: row.get(1)?,
            status: row.get(2)?,
            updated_at: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
        })
    }
}
