//! Wire contracts for the coordinator API. The worker crate reuses these
//! types, so coordinator and worker cannot drift apart silently.

use serde::{Deserialize, Serialize};

use crate::wallet::WalletDescriptor;

// Endpoints
pub const ENDPOINT_WORK_REQUEST: &str = "/work/request";
pub const ENDPOINT_WORK_RESULT: &str = "/work/result";
pub const ENDPOINT_WORK_FOUND: &str = "/work/found";
pub const ENDPOINT_RESET_TIMEOUT: &str = "/work/reset-timeout";
pub const ENDPOINT_RESET_FOUND: &str = "/work/reset-found";

// Lease request (worker -> coordinator)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequest {
    pub cpu_count: i64,
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkResponse {
    pub success: bool,
    pub passwords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypt: Option<WalletDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_found: Option<bool>,
}

// Batch result (worker -> coordinator)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    pub batch_id: String,
    pub client_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_password: Option<String>,
    #[serde(default)]
    pub passwords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_stop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_found: Option<bool>,
}

// Explicit found confirmation (idempotent latch set)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundRequest {
    pub password: String,
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundResponse {
    pub success: bool,
    pub password_found: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub success: bool,
    pub reset_count: usize,
}

// Read endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    pub id: i64,
    pub pwd: String,
    pub status: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// The `/work/stats` document. Bucket counts come from the (possibly cached)
/// snapshot; the liveness list and uptime are recomputed on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub uncheck: u64,
    pub checking: u64,
    pub checked: u64,
    pub timeout: u64,
    pub total: u64,
    pub progress: String,
    #[serde(rename = "passwordFound")]
    pub password_found: bool,
    pub database: String,
    #[serde(rename = "resetAllowed")]
    pub reset_allowed: bool,
    #[serde(rename = "tokenRequired")]
    pub token_required: bool,
    #[serde(rename = "activeClients")]
    pub active_clients: usize,
    #[serde(rename = "activeClientsList")]
    pub active_clients_list: Vec<String>,
    pub updated_at: u64,
    pub uptime: u64,
    #[serde(rename = "uptimeFormatted")]
    pub uptime_formatted: String,
}
