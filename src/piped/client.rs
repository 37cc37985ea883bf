use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::config::PipedConfig;
use super::endpoint_manager::EndpointPool;
use crate::errors::ProviderError;

pub struct PipedClient {
    pool: EndpointPool,
    client: Client,
    attempt_timeout: Duration,
}

impl PipedClient {
    pub async fn new(config: &PipedConfig) -> Result<Self, ProviderError> {
        let pool = EndpointPool::from_config(config).await;
        Self::with_pool(pool, config.timeout_secs)
    }

    pub fn with_pool(pool: EndpointPool, timeout_secs: u64) -> Result<Self, ProviderError> {
        let attempt_timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(attempt_timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            pool,
            client,
            attempt_timeout,
        })
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    /// Worst case for one logical request: every mirror times out.
    pub fn rotation_budget(&self) -> Duration {
        self.attempt_timeout * self.pool.len() as u32
    }

    /// Runs one logical GET against the mirrors, each at most once.
    ///
    /// `extract` turns the JSON body into the caller's result; an extract
    /// error counts as that mirror's failure and rotation moves on.
    pub async fn request<T, F>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        operation: &str,
        extract: F,
    ) -> Result<T, ProviderError>
    where
        F: Fn(&Value) -> Result<T, ProviderError>,
    {
        let endpoints = self.pool.attempt_order();
        if endpoints.is_empty() {
            return Err(ProviderError::NotConfigured(
                "no Piped instances configured".to_string(),
            ));
        }

        log::debug!(
            "Starting Piped {} with {} instances",
            operation,
            endpoints.len()
        );

        for (idx, endpoint) in endpoints.iter().enumerate() {
            if idx > 0 {
                // Keep the shared cursor moving with every attempt.
                self.pool.advance();
            }

            log::debug!(
                "[{}/{}] Trying {}{}",
                idx + 1,
                endpoints.len(),
                endpoint,
                path
            );

            let result = self
                .try_endpoint(endpoint, path, params)
                .await
                .and_then(|data| extract(&data));

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_rotatable() => {
                    log::warn!(
                        "[{}/{}] {} failed: {}",
                        idx + 1,
                        endpoints.len(),
                        endpoint,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }

        log::error!(
            "All {} Piped instances failed for {}",
            endpoints.len(),
            operation
        );
        Err(ProviderError::AllEndpointsFailed {
            attempts: endpoints.len(),
        })
    }

    async fn try_endpoint(
        &self,
        endpoint: &str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, ProviderError> {
        let url = reqwest::Url::parse_with_params(&format!("{}{}", endpoint, path), params)
            .map_err(|e| ProviderError::UpstreamUnavailable(format!("URL parse error: {}", e)))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::rejected(
                status.as_u16(),
                text.chars().take(200).collect::<String>(),
            ));
        }

        let data: Value = serde_json::from_str(&text)?;

        // Some mirrors answer 200 with an error document.
        if let Some(message) = data.get("error").and_then(|v| v.as_str()) {
            return Err(ProviderError::UpstreamRejected {
                status: Some(status.as_u16()),
                reason: message.to_string(),
            });
        }

        Ok(data)
    }
}
