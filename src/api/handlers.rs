//! Axum handlers for the coordinator API.
//!
//! Handlers translate HTTP requests into store/latch/stats calls. A failed
//! store operation is logged and surfaced as a 500 with an `{error}` body; it
//! never takes the process down.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;

use super::auth::{check_token, error_response};
use super::protocol::*;
use crate::config::CoordinatorConfig;
use crate::coordinator::latch::FoundLatch;
use crate::coordinator::liveness::LivenessRegistry;
use crate::coordinator::stats::StatsCache;
use crate::coordinator::uptime::Uptime;
use crate::store::records::CandidateStore;
use crate::store::types::{lease_batch_size, now_ms, STALE_LEASE_SECS};
use crate::wallet::WalletDescriptor;

/// The embedded progress dashboard; it polls `/work/stats`.
pub async fn handle_dashboard() -> Html<&'static str> {
    Html(include_str!("dashboard.html"))
}

pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn handle_count(Extension(store): Extension<Arc<CandidateStore>>) -> Response {
    match store.count() {
        Ok(count) => (StatusCode::OK, Json(CountResponse { count })).into_response(),
        Err(e) => {
            tracing::error!("Count query failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "count query failed")
        }
    }
}

pub async fn handle_get_record(
    Extension(store): Extension<Arc<CandidateStore>>,
    Path(id): Path<String>,
) -> Response {
    let id = match id.parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => return error_response(StatusCode::BAD_REQUEST, "id must be a positive integer"),
    };

    match store.get_by_id(id) {
        Ok(Some(record)) => record_response(record),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "record not found"),
        Err(e) => {
            tracing::error!("Record lookup failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "record lookup failed")
        }
    }
}

pub async fn handle_get_by_pwd(
    Extension(store): Extension<Arc<CandidateStore>>,
    Path(pwd): Path<String>,
) -> Response {
    if pwd.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "pwd must be non-empty");
    }

    match store.get_by_pwd(&pwd) {
        Ok(Some(record)) => record_response(record),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "record not found"),
        Err(e) => {
            tracing::error!("Record lookup failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "record lookup failed")
        }
    }
}

pub async fn handle_get_random(Extension(store): Extension<Arc<CandidateStore>>) -> Response {
    match store.get_random() {
        Ok(Some(record)) => record_response(record),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "no data"),
        Err(e) => {
            tracing::error!("Random record lookup failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "record lookup failed")
        }
    }
}

pub async fn handle_stats(
    Extension(store): Extension<Arc<CandidateStore>>,
    Extension(latch): Extension<Arc<FoundLatch>>,
    Extension(stats): Extension<Arc<StatsCache>>,
    Extension(liveness): Extension<Arc<LivenessRegistry>>,
    Extension(uptime): Extension<Arc<Uptime>>,
    Extension(config): Extension<Arc<CoordinatorConfig>>,
) -> Response {
    let snapshot = match stats.read(&store) {
        Ok(Some(snapshot)) => snapshot,
        // A recomputation is in flight and there is no previous snapshot yet.
        Ok(None) => return error_response(StatusCode::SERVICE_UNAVAILABLE, "updating"),
        Err(e) => {
            tracing::error!("Stats aggregation failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "stats aggregation failed");
        }
    };

    // Liveness and uptime are cheap and time-sensitive: never cached.
    let active_clients_list = liveness.active();

    (
        StatusCode::OK,
        Json(StatsResponse {
            uncheck: snapshot.counts.uncheck,
            checking: snapshot.counts.checking,
            checked: snapshot.counts.checked,
            timeout: snapshot.counts.timeout,
            total: snapshot.counts.total,
            progress: snapshot.progress,
            password_found: latch.is_set(),
            database: config.db_name.clone(),
            reset_allowed: config.reset_allowed(),
            token_required: config.token_configured(),
            active_clients: active_clients_list.len(),
            active_clients_list,
            updated_at: snapshot.computed_at_ms,
            uptime: uptime.elapsed_secs(),
            uptime_formatted: uptime.formatted(),
        }),
    )
        .into_response()
}

/// Lease endpoint: reserves a batch sized to the worker's CPU count. When the
/// latch is set or the pool is exhausted the response carries no work; the
/// `passwordFound` flag tells the worker whether to stop or back off.
pub async fn handle_work_request(
    Extension(store): Extension<Arc<CandidateStore>>,
    Extension(latch): Extension<Arc<FoundLatch>>,
    Extension(liveness): Extension<Arc<LivenessRegistry>>,
    Extension(wallet): Extension<Arc<WalletDescriptor>>,
    Extension(config): Extension<Arc<CoordinatorConfig>>,
    headers: HeaderMap,
    Json(request): Json<WorkRequest>,
) -> Response {
    if let Err(response) = check_token(&config, &headers) {
        return response;
    }
    if request.client_id.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "clientId is required");
    }

    liveness.touch(&request.client_id);

    if latch.is_set() {
        return (
            StatusCode::OK,
            Json(WorkResponse {
                success: false,
                password_found: Some(true),
                ..Default::default()
            }),
        )
            .into_response();
    }

    let limit = lease_batch_size(request.cpu_count);
    let batch = match store.reserve_batch(limit) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!("Batch reservation failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "batch reservation failed");
        }
    };

    if batch.is_empty() {
        tracing::debug!("Pool exhausted, no work for {}", request.client_id);
        return (StatusCode::OK, Json(WorkResponse::default())).into_response();
    }

    let batch_id = format!("{}-{}", request.client_id, now_ms());
    let passwords: Vec<String> = batch.into_iter().map(|(_, pwd)| pwd).collect();
    tracing::info!(
        "Leased {} candidates to {} (batch {})",
        passwords.len(),
        request.client_id,
        batch_id
    );

    (
        StatusCode::OK,
        Json(WorkResponse {
            success: true,
            count: passwords.len(),
            passwords,
            encrypt: Some(wallet.as_ref().clone()),
            batch_id: Some(batch_id),
            password_found: None,
        }),
    )
        .into_response()
}

/// Batch result endpoint. A success report latches the terminal state before
/// the worker is acknowledged; a failure report marks the batch CHECKED.
pub async fn handle_work_result(
    Extension(store): Extension<Arc<CandidateStore>>,
    Extension(latch): Extension<Arc<FoundLatch>>,
    Extension(liveness): Extension<Arc<LivenessRegistry>>,
    Extension(config): Extension<Arc<CoordinatorConfig>>,
    headers: HeaderMap,
    Json(request): Json<ResultRequest>,
) -> Response {
    if let Err(response) = check_token(&config, &headers) {
        return response;
    }
    if request.client_id.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "clientId is required");
    }

    liveness.touch(&request.client_id);

    if request.success {
        let Some(password) = request
            .found_password
            .as_deref()
            .filter(|pwd| !pwd.is_empty())
        else {
            return error_response(StatusCode::BAD_REQUEST, "foundPassword is required");
        };

        // Durable before the acknowledgment leaves this handler.
        if let Err(e) = latch.set(password, &request.client_id) {
            tracing::error!("Failed to persist found-marker: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to persist result");
        }
        tracing::info!(
            "Password found by {} in batch {}",
            request.client_id,
            request.batch_id
        );

        return (
            StatusCode::OK,
            Json(ResultResponse {
                success: true,
                message: "password recorded".to_string(),
                should_stop: Some(true),
                password_found: Some(true),
            }),
        )
            .into_response();
    }

    let checked = match store.mark_checked(&request.passwords) {
        Ok(checked) => checked,
        Err(e) => {
            tracing::error!("Failed to mark batch {} checked: {}", request.batch_id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to record result");
        }
    };
    tracing::debug!(
        "Batch {} reported clean, {} candidates marked checked",
        request.batch_id,
        checked
    );

    let found = latch.is_set();
    (
        StatusCode::OK,
        Json(ResultResponse {
            success: true,
            message: format!("{} candidates marked checked", checked),
            should_stop: found.then_some(true),
            password_found: found.then_some(true),
        }),
    )
        .into_response()
}

/// Explicit found confirmation. Idempotent for the in-memory bit; every call
/// appends another marker stanza on purpose.
pub async fn handle_work_found(
    Extension(latch): Extension<Arc<FoundLatch>>,
    Extension(liveness): Extension<Arc<LivenessRegistry>>,
    Extension(config): Extension<Arc<CoordinatorConfig>>,
    headers: HeaderMap,
    Json(request): Json<FoundRequest>,
) -> Response {
    if let Err(response) = check_token(&config, &headers) {
        return response;
    }
    if request.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "password is required");
    }

    liveness.touch(&request.client_id);

    if let Err(e) = latch.set(&request.password, &request.client_id) {
        tracing::error!("Failed to persist found-marker: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to persist result");
    }
    tracing::info!("Found confirmation from {}", request.client_id);

    (
        StatusCode::OK,
        Json(FoundResponse {
            success: true,
            password_found: true,
        }),
    )
        .into_response()
}

/// Operator-facing sweep: reclaims over-age CHECKING leases immediately
/// instead of waiting for the periodic sweeper tick.
pub async fn handle_reset_timeout(
    Extension(store): Extension<Arc<CandidateStore>>,
    Extension(config): Extension<Arc<CoordinatorConfig>>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_token(&config, &headers) {
        return response;
    }

    match store.reclaim_stale(STALE_LEASE_SECS) {
        Ok(reset_count) => {
            if reset_count > 0 {
                tracing::info!("Reclaimed {} stale leases", reset_count);
            }
            (
                StatusCode::OK,
                Json(ResetResponse {
                    success: true,
                    reset_count,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Stale lease reclamation failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "reclamation failed")
        }
    }
}

/// Destructive reset: clears the latch (backing up the marker) and returns
/// every row to UNCHECKED. Only honored on the designated sample store.
pub async fn handle_reset_found(
    Extension(store): Extension<Arc<CandidateStore>>,
    Extension(latch): Extension<Arc<FoundLatch>>,
    Extension(config): Extension<Arc<CoordinatorConfig>>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_token(&config, &headers) {
        return response;
    }
    if !config.reset_allowed() {
        return error_response(
            StatusCode::FORBIDDEN,
            "reset is only permitted on the sample database",
        );
    }

    match latch.clear_with_backup() {
        Ok(Some(backup)) => tracing::info!("Found-marker backed up to {}", backup.display()),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to clear found-marker: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to clear marker");
        }
    }

    match store.reset_all() {
        Ok(reset_count) => {
            tracing::warn!("Sample store reset, {} rows back to unchecked", reset_count);
            (
                StatusCode::OK,
                Json(ResetResponse {
                    success: true,
                    reset_count,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Store reset failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "store reset failed")
        }
    }
}

fn record_response(record: crate::store::types::CandidateRecord) -> Response {
    (
        StatusCode::OK,
        Json(RecordResponse {
            id: record.id,
            pwd: record.pwd,
            status: record.status,
        }),
    )
        .into_response()
}
