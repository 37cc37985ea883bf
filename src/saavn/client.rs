use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::config::SaavnConfig;
use crate::errors::ProviderError;

pub struct SaavnClient {
    client: Client,
    api_base: String,
}

impl SaavnClient {
    pub fn new(config: &SaavnConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// GETs `path` and unwraps the `{success, data}` envelope.
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let url = reqwest::Url::parse_with_params(&format!("{}{}", self.api_base, path), params)
            .map_err(|e| ProviderError::UpstreamUnavailable(format!("URL parse error: {}", e)))?;

        log::debug!("JioSaavn GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::rejected(
                status.as_u16(),
                text.chars().take(200).collect::<String>(),
            ));
        }

        let mut body: Value = serde_json::from_str(&text)?;

        if body.get("success").and_then(|v| v.as_bool()) == Some(false) {
            let message = body
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("request unsuccessful");
            return Err(ProviderError::UpstreamRejected {
                status: Some(status.as_u16()),
                reason: message.to_string(),
            });
        }

        match body.get_mut("data") {
            Some(data) => Ok(data.take()),
            None => Ok(body),
        }
    }
}
