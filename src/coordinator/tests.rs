//! Coordinator State Tests
//!
//! Latch durability and audit appends run against temp directories; the
//! stats cache and liveness registry run fully in memory.

#[cfg(test)]
mod tests {
    use crate::coordinator::latch::FoundLatch;
    use crate::coordinator::liveness::LivenessRegistry;
    use crate::coordinator::stats::{ttl_for, StatsCache};
    use crate::coordinator::uptime::{format_uptime, Uptime};
    use crate::store::records::CandidateStore;
    use std::time::Duration;

    // ============================================================
    // TERMINAL LATCH
    // ============================================================

    #[test]
    fn test_latch_starts_clear_without_marker() {
        let dir = tempfile::tempdir().unwrap();
        let latch = FoundLatch::load(dir.path().join("PASSWORD_FOUND.txt"));
        assert!(!latch.is_set());
    }

    #[test]
    fn test_latch_set_is_durable() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("PASSWORD_FOUND.txt");

        let latch = FoundLatch::load(&marker);
        latch.set("hunter2", "worker-1").unwrap();
        assert!(latch.is_set());
        assert!(marker.exists());

        // A fresh load (as after a restart) sees the marker.
        let reloaded = FoundLatch::load(&marker);
        assert!(reloaded.is_set());
    }

    #[test]
    fn test_each_confirmation_appends_a_stanza() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("PASSWORD_FOUND.txt");
        let latch = FoundLatch::load(&marker);

        latch.set("hunter2", "worker-1").unwrap();
        latch.set("hunter2", "worker-1").unwrap();
        latch.set("hunter2", "worker-2").unwrap();

        let content = std::fs::read_to_string(&marker).unwrap();
        assert_eq!(content.matches("password=hunter2").count(), 3);
        assert!(content.contains("client=worker-2"));
    }

    #[test]
    fn test_clear_backs_up_the_marker() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("PASSWORD_FOUND.txt");
        let latch = FoundLatch::load(&marker);
        latch.set("hunter2", "worker-1").unwrap();

        let backup = latch.clear_with_backup().unwrap().unwrap();
        assert!(!latch.is_set());
        assert!(!marker.exists());
        assert!(backup.exists());
        let backed_up = std::fs::read_to_string(&backup).unwrap();
        assert!(backed_up.contains("password=hunter2"));

        // Clearing an already-clear latch is a quiet no-op.
        assert!(latch.clear_with_backup().unwrap().is_none());
    }

    // ============================================================
    // LIVENESS REGISTRY
    // ============================================================

    #[test]
    fn test_liveness_lists_recent_clients_sorted() {
        let registry = LivenessRegistry::new();
        registry.touch("worker-b");
        registry.touch("worker-a");
        registry.touch("worker-b");

        assert_eq!(registry.active(), vec!["worker-a", "worker-b"]);
    }

    // ============================================================
    // STATS CACHE
    // ============================================================

    #[test]
    fn test_ttl_scales_with_cardinality() {
        assert_eq!(ttl_for(0), Duration::ZERO);
        assert_eq!(ttl_for(10_000), Duration::ZERO);
        // Below a million rows the floor keeps recomputing.
        assert_eq!(ttl_for(500_000), Duration::ZERO);
        assert_eq!(ttl_for(2_500_000), Duration::from_secs(2 * 60));
        assert_eq!(ttl_for(120_000_000), Duration::from_secs(60 * 60));
    }

    #[test]
    fn test_stats_cache_recomputes_small_pools() {
        let store = CandidateStore::open_in_memory().unwrap();
        store
            .insert_batch(&["aa".to_string(), "bb".to_string()])
            .unwrap();
        let cache = StatsCache::new();

        let first = cache.read(&store).unwrap().unwrap();
        assert_eq!(first.counts.total, 2);
        assert_eq!(first.progress, "0.00");

        store.reserve_batch(2).unwrap();
        store
            .mark_checked(&["aa".to_string(), "bb".to_string()])
            .unwrap();

        // TTL is zero at this size, so the next read sees the new state.
        let second = cache.read(&store).unwrap().unwrap();
        assert_eq!(second.counts.checked, 2);
        assert_eq!(second.progress, "100.00");
    }

    // ============================================================
    // UPTIME
    // ============================================================

    #[test]
    fn test_startup_time_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("startup_time.txt");

        let first = Uptime::load_or_init(&path);
        let second = Uptime::load_or_init(&path);
        assert_eq!(first.startup_ms(), second.startup_ms());
    }

    #[test]
    fn test_mangled_startup_artifact_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("startup_time.txt");
        std::fs::write(&path, "not-a-number").unwrap();

        let uptime = Uptime::load_or_init(&path);
        assert!(uptime.startup_ms() > 0);
        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert_eq!(rewritten.trim(), uptime.startup_ms().to_string());
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0s");
        assert_eq!(format_uptime(59), "59s");
        assert_eq!(format_uptime(61), "1m 1s");
        assert_eq!(format_uptime(3_661), "1h 1m 1s");
        assert_eq!(format_uptime(90_061), "1d 1h 1m 1s");
    }
}
