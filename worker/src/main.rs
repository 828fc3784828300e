//! Worker binary: lease -> verify -> report, until the pool is exhausted or
//! the coordinator signals that the password has been found.

use std::time::Duration;

use anyhow::Result;
use sysinfo::System;
use uuid::Uuid;

use distributed_cracker::api::protocol::ResultRequest;
use distributed_cracker::wallet::WalletDescriptor;

mod client;
mod runtime;

#[cfg(test)]
mod tests;

use client::CoordinatorClient;

/// Backoff when the coordinator is unreachable or has no work.
const IDLE_BACKOFF: Duration = Duration::from_secs(10);

/// Confirm-found retry ladder: first the tight attempts, then the slow ones.
const CONFIRM_ATTEMPTS: usize = 5;
const CONFIRM_BACKOFF: Duration = Duration::from_secs(5);
const CONFIRM_FALLBACK_ATTEMPTS: usize = 3;
const CONFIRM_FALLBACK_BACKOFF: Duration = Duration::from_secs(10);

struct WorkerConfig {
    server_url: String,
    api_token: Option<String>,
    max_workers: usize,
    cpu_usage_ratio: f64,
}

impl WorkerConfig {
    fn from_env() -> Self {
        Self {
            server_url: std::env::var("SERVER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string()),
            api_token: std::env::var("API_TOKEN")
                .ok()
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
            max_workers: std::env::var("MAX_WORKERS")
                .ok()
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(16),
            cpu_usage_ratio: std::env::var("CPU_USAGE_RATIO")
                .ok()
                .and_then(|value| value.parse::<f64>().ok())
                .unwrap_or(1.0),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|value| value.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(log_level).init();

    let config = WorkerConfig::from_env();
    let client_id = format!("worker-{}", Uuid::new_v4());

    let system = System::new_all();
    let detected_cpus = system.cpus().len().max(1);
    let units = execution_units(detected_cpus, config.cpu_usage_ratio, config.max_workers);

    tracing::info!(
        "Worker {} starting: server={} cpus={} units={}",
        client_id,
        config.server_url,
        detected_cpus,
        units
    );

    let client = CoordinatorClient::new(&config.server_url, config.api_token.clone());
    control_loop(&client, &client_id, detected_cpus as i64, units).await
}

/// Local parallelism: detected cores scaled by the advisory ratio, capped by
/// `MAX_WORKERS`, never below one unit.
fn execution_units(detected_cpus: usize, ratio: f64, max_workers: usize) -> usize {
    let ratio = if ratio.is_finite() && ratio > 0.0 {
        ratio.min(1.0)
    } else {
        1.0
    };
    let scaled = ((detected_cpus as f64) * ratio).floor() as usize;
    scaled.clamp(1, max_workers.max(1))
}

async fn control_loop(
    client: &CoordinatorClient,
    client_id: &str,
    cpu_count: i64,
    units: usize,
) -> Result<()> {
    loop {
        let work = match client.request_work(cpu_count, client_id).await {
            Ok(work) => work,
            Err(e) => {
                tracing::warn!("Lease request failed: {}", e);
                tokio::time::sleep(IDLE_BACKOFF).await;
                continue;
            }
        };

        if work.password_found.unwrap_or(false) {
            tracing::info!("Coordinator reports the password was found, stopping");
            return Ok(());
        }
        if !work.success || work.passwords.is_empty() {
            tracing::info!("No work available, retrying in {:?}", IDLE_BACKOFF);
            tokio::time::sleep(IDLE_BACKOFF).await;
            continue;
        }
        let Some(wallet) = work.encrypt.clone() else {
            tracing::warn!("Lease without wallet descriptor, retrying");
            tokio::time::sleep(IDLE_BACKOFF).await;
            continue;
        };

        let batch_id = work.batch_id.clone().unwrap_or_default();
        let passwords = work.passwords;
        tracing::info!("Leased {} candidates (batch {})", passwords.len(), batch_id);

        let matched = run_batch_blocking(passwords.clone(), wallet, units).await?;

        match matched {
            Some(password) => {
                tracing::info!("Match in batch {}", batch_id);
                submit_success(client, client_id, &batch_id, &password, passwords).await;
                confirm_found(client, client_id, &password).await;
                return Ok(());
            }
            None => {
                submit_failure(client, client_id, &batch_id, passwords).await;
            }
        }
    }
}

/// The verification fan-out is pure CPU work; run it off the async runtime.
async fn run_batch_blocking(
    passwords: Vec<String>,
    wallet: WalletDescriptor,
    units: usize,
) -> Result<Option<String>> {
    let matched =
        tokio::task::spawn_blocking(move || runtime::run_batch(&passwords, &wallet, units)).await?;
    Ok(matched)
}

/// The success report carries the full leased set for bookkeeping. Network
/// errors retry on the usual 10 s backoff until the coordinator acknowledges.
async fn submit_success(
    client: &CoordinatorClient,
    client_id: &str,
    batch_id: &str,
    password: &str,
    passwords: Vec<String>,
) {
    let request = ResultRequest {
        batch_id: batch_id.to_string(),
        client_id: client_id.to_string(),
        success: true,
        found_password: Some(password.to_string()),
        passwords,
    };

    loop {
        match client.submit_result(&request).await {
            Ok(_) => {
                tracing::info!("Success report for batch {} acknowledged", batch_id);
                return;
            }
            Err(e) => {
                tracing::warn!("Success report failed, retrying in {:?}: {}", IDLE_BACKOFF, e);
                tokio::time::sleep(IDLE_BACKOFF).await;
            }
        }
    }
}

/// Failure reports mark the batch CHECKED on the coordinator. Network errors
/// retry on the usual 10 s backoff until the coordinator acknowledges.
async fn submit_failure(
    client: &CoordinatorClient,
    client_id: &str,
    batch_id: &str,
    passwords: Vec<String>,
) {
    let request = ResultRequest {
        batch_id: batch_id.to_string(),
        client_id: client_id.to_string(),
        success: false,
        found_password: None,
        passwords,
    };

    loop {
        match client.submit_result(&request).await {
            Ok(_) => return,
            Err(e) => {
                tracing::warn!("Failure report failed, retrying in {:?}: {}", IDLE_BACKOFF, e);
                tokio::time::sleep(IDLE_BACKOFF).await;
            }
        }
    }
}

/// Confirm-found ladder: 5 attempts at 5 s, then 3 attempts at 10 s, then
/// give up and exit anyway (the success report most likely latched already).
async fn confirm_found(client: &CoordinatorClient, client_id: &str, password: &str) {
    for attempt in 1..=CONFIRM_ATTEMPTS {
        match client.confirm_found(client_id, password).await {
            Ok(_) => {
                tracing::info!("Found confirmation acknowledged");
                return;
            }
            Err(e) => {
                tracing::warn!(
                    "Confirm-found attempt {}/{} failed: {}",
                    attempt,
                    CONFIRM_ATTEMPTS,
                    e
                );
                tokio::time::sleep(CONFIRM_BACKOFF).await;
            }
        }
    }

    for attempt in 1..=CONFIRM_FALLBACK_ATTEMPTS {
        match client.confirm_found(client_id, password).await {
            Ok(_) => {
                tracing::info!("Found confirmation acknowledged");
                return;
            }
            Err(e) => {
                tracing::warn!(
                    "Confirm-found fallback attempt {}/{} failed: {}",
                    attempt,
                    CONFIRM_FALLBACK_ATTEMPTS,
                    e
                );
                tokio::time::sleep(CONFIRM_FALLBACK_BACKOFF).await;
            }
        }
    }
    tracing::error!("Giving up on found confirmation; check the coordinator marker file");
}
