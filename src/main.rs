use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use distributed_cracker::api::handlers::{
    handle_count, handle_dashboard, handle_get_by_pwd, handle_get_random, handle_get_record,
    handle_health, handle_reset_found, handle_reset_timeout, handle_stats, handle_work_found,
    handle_work_request, handle_work_result,
};
use distributed_cracker::api::protocol::{
    ENDPOINT_RESET_FOUND, ENDPOINT_RESET_TIMEOUT, ENDPOINT_WORK_FOUND, ENDPOINT_WORK_REQUEST,
    ENDPOINT_WORK_RESULT,
};
use distributed_cracker::config::CoordinatorConfig;
use distributed_cracker::coordinator::latch::{FoundLatch, MARKER_FILE};
use distributed_cracker::coordinator::liveness::LivenessRegistry;
use distributed_cracker::coordinator::stats::StatsCache;
use distributed_cracker::coordinator::uptime::{Uptime, STARTUP_TIME_FILE};
use distributed_cracker::store::records::CandidateStore;
use distributed_cracker::store::types::STALE_LEASE_SECS;
use distributed_cracker::wallet::WalletDescriptor;

const SWEEPER_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|value| value.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(log_level).init();

    let config = Arc::new(CoordinatorConfig::from_env());

    // Missing store or wallet is fatal: the pool is seeded out of band and
    // there is nothing useful to serve without either.
    let store = Arc::new(CandidateStore::open(&config.db_name)?);
    let wallet = Arc::new(WalletDescriptor::load(&config.wallet_file)?);

    let latch = Arc::new(FoundLatch::load(MARKER_FILE));
    let uptime = Arc::new(Uptime::load_or_init(STARTUP_TIME_FILE));
    let liveness = Arc::new(LivenessRegistry::new());
    let stats = Arc::new(StatsCache::new());

    tracing::info!(
        "Coordinator starting: db={} candidates={} resetAllowed={} tokenConfigured={}",
        config.db_name,
        store.count().unwrap_or(0),
        config.reset_allowed(),
        config.token_configured()
    );

    // Background sweeper: over-age CHECKING leases drift back to UNCHECKED.
    // Failures are logged and swallowed; the next tick retries.
    let sweeper_store = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEPER_INTERVAL);
        interval.tick().await; // the startup tick
        loop {
            interval.tick().await;
            match sweeper_store.reclaim_stale(STALE_LEASE_SECS) {
                Ok(0) => tracing::debug!("Sweeper tick, nothing to reclaim"),
                Ok(reclaimed) => tracing::info!("Sweeper reclaimed {} stale leases", reclaimed),
                Err(e) => tracing::warn!("Sweeper tick failed: {}", e),
            }
        }
    });

    let app = Router::new()
        .route("/", get(handle_dashboard))
        .route("/health", get(handle_health))
        .route("/count", get(handle_count))
        .route("/records/random", get(handle_get_random))
        .route("/records/by-pwd/:pwd", get(handle_get_by_pwd))
        .route("/records/:id", get(handle_get_record))
        .route("/work/stats", get(handle_stats))
        .route(ENDPOINT_WORK_REQUEST, post(handle_work_request))
        .route(ENDPOINT_WORK_RESULT, post(handle_work_result))
        .route(ENDPOINT_WORK_FOUND, post(handle_work_found))
        .route(ENDPOINT_RESET_TIMEOUT, post(handle_reset_timeout))
        .route(ENDPOINT_RESET_FOUND, post(handle_reset_found))
        .layer(Extension(store))
        .layer(Extension(wallet))
        .layer(Extension(latch))
        .layer(Extension(uptime))
        .layer(Extension(liveness))
        .layer(Extension(stats))
        .layer(Extension(config.clone()));

    let bind_addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Coordinator listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Coordinator stopped");
    Ok(())
}

/// Resolves on the first Ctrl+C so the server drains in-flight requests; a
/// second Ctrl+C force-exits.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    tracing::info!("Shutdown requested, draining (Ctrl+C again to force)");
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("Forced shutdown");
            std::process::exit(1);
        }
    });
}
