//! HTTP client for the coordinator's work endpoints.
//!
//! One reusable reqwest client; every call POSTs a JSON body with the shared
//! secret in both accepted header forms. Network and non-2xx failures bubble
//! up as errors for the control loop's backoff.

use std::time::Duration;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

use distributed_cracker::api::auth::TOKEN_HEADER;
use distributed_cracker::api::protocol::{
    FoundRequest, FoundResponse, ResultRequest, ResultResponse, WorkRequest, WorkResponse,
    ENDPOINT_WORK_FOUND, ENDPOINT_WORK_REQUEST, ENDPOINT_WORK_RESULT,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CoordinatorClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl CoordinatorClient {
    pub fn new(server_url: &str, api_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(server_url),
            api_token,
        }
    }

    pub async fn request_work(&self, cpu_count: i64, client_id: &str) -> Result<WorkResponse> {
        self.post(
            ENDPOINT_WORK_REQUEST,
            &WorkRequest {
                cpu_count,
                client_id: client_id.to_string(),
            },
        )
        .await
    }

    pub async fn submit_result(&self, request: &ResultRequest) -> Result<ResultResponse> {
        self.post(ENDPOINT_WORK_RESULT, request).await
    }

    pub async fn confirm_found(&self, client_id: &str, password: &str) -> Result<FoundResponse> {
        self.post(
            ENDPOINT_WORK_FOUND,
            &FoundRequest {
                password: password.to_string(),
                client_id: client_id.to_string(),
            },
        )
        .await
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.post(&url).json(body).timeout(REQUEST_TIMEOUT);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token).header(TOKEN_HEADER, token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("{} returned {}: {}", path, status, detail);
        }
        Ok(response.json().await?)
    }
}

/// Ensures a scheme and strips any trailing slash so endpoint paths append
/// cleanly.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    with_scheme.trim_end_matches('/').to_string()
}
