use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::types::{BatchRequest, BatchStatusResponse, BatchTokenEntry};
use super::{JudgeError, RunResult, RunSpec, SubmissionToken};

/// Batch code-execution service.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Submits every run in one request. Tokens come back in input order.
    async fn submit_batch(&self, runs: &[RunSpec]) -> Result<Vec<SubmissionToken>, JudgeError>;

    /// Waits until every run is finished and returns the results in the
    /// order of `tokens`.
    async fn poll_batch_results(
        &self,
        tokens: &[SubmissionToken],
    ) -> Result<Vec<RunResult>, JudgeError>;
}

#[derive(Debug, Clone)]
pub struct JudgeSettings {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub poll_interval: Duration,
    /// Upper bound on the whole poll loop, not on a single request.
    pub poll_timeout: Duration,
    pub request_timeout: Duration,
}

impl JudgeSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            poll_interval: Duration::from_secs(1),
            poll_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for a Judge0 instance.
pub struct Judge0Client {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl Judge0Client {
    pub fn new(settings: JudgeSettings) -> Result<Self, JudgeError> {
        let base_url = settings.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(JudgeError::MissingBaseUrl);
        }

        let client = Client::builder().timeout(settings.request_timeout).build()?;

        Ok(Self {
            client,
            base_url,
            auth_token: settings.auth_token,
            poll_interval: settings.poll_interval,
            poll_timeout: settings.poll_timeout,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.auth_token {
            Some(token) => request.header("X-Auth-Token", token),
            None => request,
        }
    }

    async fn fetch_batch(&self, tokens_csv: &str) -> Result<Vec<RunResult>, JudgeError> {
        let response = self
            .request(Method::GET, "/submissions/batch")
            .query(&[
                ("tokens", tokens_csv),
                ("base64_encoded", "false"),
                ("fields", "*"),
            ])
            .send()
            .await?;

        let batch: BatchStatusResponse = read_json(response).await?;
        Ok(batch.submissions.into_iter().flatten().collect())
    }

    async fn poll_until_done(&self, tokens_csv: &str) -> Result<Vec<RunResult>, JudgeError> {
        let mut rounds: u32 = 0;
        loop {
            rounds += 1;
            let results = self.fetch_batch(tokens_csv).await?;

            let pending = results.iter().filter(|r| !r.status.is_terminal()).count();
            if pending == 0 {
                info!("Judge finished {} runs after {} polls", results.len(), rounds);
                return Ok(results);
            }

            debug!("Poll {}: {} of {} runs still pending", rounds, pending, results.len());
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl Judge for Judge0Client {
    async fn submit_batch(&self, runs: &[RunSpec]) -> Result<Vec<SubmissionToken>, JudgeError> {
        if runs.is_empty() {
            return Ok(Vec::new());
        }
        info!("Submitting batch of {} runs to judge", runs.len());

        let response = self
            .request(Method::POST, "/submissions/batch")
            .query(&[("base64_encoded", "false")])
            .json(&BatchRequest { submissions: runs })
            .send()
            .await?;

        let entries: Vec<BatchTokenEntry> = read_json(response).await?;
        if entries.len() != runs.len() {
            return Err(JudgeError::UnexpectedResponse(format!(
                "submitted {} runs, got {} tokens",
                runs.len(),
                entries.len()
            )));
        }

        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                entry.token.ok_or_else(|| JudgeError::Rejected {
                    index,
                    detail: serde_json::Value::Object(entry.errors).to_string(),
                })
            })
            .collect()
    }

    // Dropping the returned future stops polling at the next await.
    async fn poll_batch_results(
        &self,
        tokens: &[SubmissionToken],
    ) -> Result<Vec<RunResult>, JudgeError> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let tokens_csv = tokens
            .iter()
            .map(SubmissionToken::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let results = tokio::time::timeout(self.poll_timeout, self.poll_until_done(&tokens_csv))
            .await
            .map_err(|_| {
                warn!("Judge did not finish {} runs within {:?}", tokens.len(), self.poll_timeout);
                JudgeError::Timeout(self.poll_timeout)
            })??;

        correlate(tokens, results)
    }
}

/// Orders `results` by `tokens`, matching on token value.
pub(crate) fn correlate(
    tokens: &[SubmissionToken],
    results: Vec<RunResult>,
) -> Result<Vec<RunResult>, JudgeError> {
    let mut by_token: HashMap<SubmissionToken, RunResult> = results
        .into_iter()
        .map(|result| (result.token.clone(), result))
        .collect();

    tokens
        .iter()
        .map(|token| {
            by_token
                .remove(token)
                .ok_or_else(|| JudgeError::MissingResult(token.clone()))
        })
        .collect()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, JudgeError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!("Judge returned {}: {}", status, body);
        return Err(JudgeError::Status { status, body });
    }

    serde_json::from_str(&body).map_err(|e| JudgeError::UnexpectedResponse(e.to_string()))
}
