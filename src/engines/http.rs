// file: src/engines/http.rs
// description: shared HTTP client with politeness delay and retry with backoff
// reference: https://docs.rs/reqwest

use crate::config::HttpConfig;
use crate::error::{OverlapError, Result};
use crate::models::EngineKind;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const BACKOFF_BASE_MS: u64 = 250;

pub struct HttpClient {
    client: Client,
    max_retries: u32,
    request_delay: Duration,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .cookie_store(true)
            .build()
            .map_err(|e| OverlapError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            request_delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    pub async fn get_text(
        &self,
        engine: EngineKind,
        url: Url,
        headers: &[(&str, String)],
    ) -> Result<String> {
        let response = self.send(engine, url, headers).await?;
        response
            .text()
            .await
            .map_err(|e| OverlapError::http(engine.display_name(), e.to_string()))
    }

    pub async fn get_json(
        &self,
        engine: EngineKind,
        url: Url,
        headers: &[(&str, String)],
    ) -> Result<serde_json::Value> {
        let body = self.get_text(engine, url, headers).await?;
        serde_json::from_str(&body).map_err(|e| {
            OverlapError::parse(engine.display_name(), format!("invalid JSON body: {}", e))
        })
    }

    async fn send(
        &self,
        engine: EngineKind,
        url: Url,
        headers: &[(&str, String)],
    ) -> Result<reqwest::Response> {
        let mut attempt = 0u32;

        loop {
            if !self.request_delay.is_zero() {
                sleep(self.request_delay).await;
            }

            debug!(engine = %engine, url = %url, attempt, "Sending request");

            let mut request = self.client.get(url.clone());
            for (name, value) in headers {
                request = request.header(*name, value.as_str());
            }

            let failure = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let message = format!("status {}: {}", status, truncate(&body, 200));
                    if !is_retryable(status) {
                        return Err(OverlapError::http(engine.display_name(), message));
                    }
                    message
                }
                Err(e) => e.to_string(),
            };

            attempt += 1;
            if attempt > self.max_retries {
                return Err(OverlapError::http(engine.display_name(), failure));
            }

            let backoff = Duration::from_millis(BACKOFF_BASE_MS * 2u64.pow(attempt.min(5)));
            warn!(
                engine = %engine,
                attempt,
                "Request failed ({}), retrying in {}ms",
                failure,
                backoff.as_millis()
            );
            sleep(backoff).await;
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

/// Joins a path onto an engine base URL.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub fn build_url(
    engine: EngineKind,
    base: &str,
    params: &[(&str, String)],
) -> Result<Url> {
    Url::parse_with_params(base, params).map_err(|e| {
        OverlapError::Config(format!(
            "{} URL \"{}\" is invalid: {}",
            engine.display_name(),
            base,
            e
        ))
    })
}
