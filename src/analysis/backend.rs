//! Seam to the remote analysis service.
//!
//! `AnalysisBackend` is the trait the coordinator and poller are written
//! against; `HttpAnalysisBackend` is the reqwest-backed production
//! implementation. One method call is one HTTP request — retry policy
//! belongs to callers, never to this layer.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::error::AnalysisError;

/// Header carrying the service credential on every call.
const API_KEY_HEADER: &str = "X-API-Key";

/// Connect timeout for upstream calls.
const CONNECT_TIMEOUT_SECS: u64 = 10;

// ═══════════════════════════════════════════
// Wire shapes
// ═══════════════════════════════════════════

/// Response to a successful submission.
///
/// `task_id` stays optional here; its absence is a contract violation the
/// coordinator turns into `MissingTaskId`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReceipt {
    #[serde(default)]
    pub task_id: Option<String>,
}

/// One status-poll response.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub status: Option<String>,
    /// Fractional progress, 0-100, when the service reports one.
    #[serde(default)]
    pub progress: Option<f64>,
    /// Job-embedded failure. Terminal for the submission.
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusReport {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }
}

// ═══════════════════════════════════════════
// Backend trait
// ═══════════════════════════════════════════

/// The three operations of the remote analysis service.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// `POST /analyze` — multipart upload of one PDF.
    async fn submit(&self, file_name: &str, bytes: Vec<u8>) -> Result<SubmitReceipt, AnalysisError>;

    /// `GET /status/{task_id}` — one status check, no retry.
    async fn status(&self, task_id: &str) -> Result<StatusReport, AnalysisError>;

    /// `GET /kid-json` — the finalized structured document. Pure read,
    /// no side effects; the caller must already know the job completed.
    async fn fetch_result(&self) -> Result<serde_json::Value, AnalysisError>;
}

// ═══════════════════════════════════════════
// HTTP implementation
// ═══════════════════════════════════════════

/// Production backend over HTTP.
pub struct HttpAnalysisBackend {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpAnalysisBackend {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Perform one request: send, distinguish connectivity failures from
    /// server rejections, and return the raw success body.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, AnalysisError> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|_| AnalysisError::Connectivity)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            return Err(AnalysisError::RequestFailed {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn submit(&self, file_name: &str, bytes: Vec<u8>) -> Result<SubmitReceipt, AnalysisError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let body = self
            .execute(self.client.post(self.endpoint("/analyze")).multipart(form))
            .await?;

        serde_json::from_str(&body)
            .map_err(|_| AnalysisError::InvalidResponse("submission response was not valid JSON".to_string()))
    }

    async fn status(&self, task_id: &str) -> Result<StatusReport, AnalysisError> {
        let url = self.endpoint(&format!("/status/{task_id}"));
        let body = self.execute(self.client.get(url)).await?;

        serde_json::from_str(&body)
            .map_err(|_| AnalysisError::InvalidResponse("status response was not valid JSON".to_string()))
    }

    async fn fetch_result(&self) -> Result<serde_json::Value, AnalysisError> {
        let body = self.execute(self.client.get(self.endpoint("/kid-json"))).await?;

        serde_json::from_str(&body)
            .map_err(|_| AnalysisError::InvalidResponse("result body was not valid JSON".to_string()))
    }
}

/// Extract the most useful message from an error body: the JSON `message`
/// or `error` field when the body parses, else the raw text.
fn server_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| value.get("error").and_then(|m| m.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}
