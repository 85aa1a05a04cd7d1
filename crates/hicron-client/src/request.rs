use std::time::Duration;

use serde_json::Value;

use crate::error::JobError;

pub mod doniai;
pub mod envelope;

pub use envelope::Envelope;

/// Upper bound for one outbound request when the config sets none.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Plain GET returning the decoded JSON body.
#[expect(async_fn_in_trait)]
pub trait HttpClient: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, JobError>;
}

/// `reqwest`-backed client with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Result<Self, JobError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()?;

        Ok(Self { client, timeout })
    }
}

impl HttpClient for ReqwestClient {
    async fn get_json(&self, url: &str) -> Result<Value, JobError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| JobError::Transport(format!("Request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            log::debug!("GET {url} failed with status: {status}\n==== Response: ====\n {text}");
            return Err(JobError::Transport(format!(
                "GET {url} failed with status: {status}"
            )));
        }

        let response_text = response.text().await?;

        serde_json::from_str(&response_text)
            .map_err(|e| JobError::Transport(format!("Failed to parse JSON response: {e}")))
    }
}
