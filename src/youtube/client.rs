use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::clients::{ClientKind, ClientProfile};
use super::config::YouTubeConfig;
use crate::errors::ProviderError;

pub const CLIENT_NAME_HEADER: &str = "X-YouTube-Client-Name";
pub const CLIENT_VERSION_HEADER: &str = "X-YouTube-Client-Version";

/// Raw InnerTube access: one POST per call, identity chosen by the caller.
pub struct InnerTubeClient {
    client: Client,
    config: YouTubeConfig,
}

impl InnerTubeClient {
    pub fn new(config: YouTubeConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &YouTubeConfig {
        &self.config
    }

    /// POSTs `body` to `/<endpoint>` impersonating `profile`.
    ///
    /// The `context` block is filled in here, so callers only send the
    /// operation-specific fields.
    pub async fn post(
        &self,
        endpoint: &str,
        profile: &ClientProfile,
        mut body: Value,
        timeout: Duration,
    ) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/{}?prettyPrint=false",
            self.config.api_base.trim_end_matches('/'),
            endpoint
        );
        body["context"] = profile.context(&self.config.hl, &self.config.gl);

        let mut request = self
            .client
            .post(&url)
            .timeout(timeout)
            .header(USER_AGENT, profile.user_agent)
            .header(CONTENT_TYPE, "application/json")
            .header(CLIENT_NAME_HEADER, profile.id.to_string())
            .header(CLIENT_VERSION_HEADER, profile.version);

        for (name, value) in profile.extra_headers {
            request = request.header(*name, *value);
        }

        let response = request.json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::rejected(
                status.as_u16(),
                text.chars().take(200).collect::<String>(),
            ));
        }

        Ok(response.json::<Value>().await?)
    }

    /// Tries `clients` in order, one attempt each, until `extract` accepts
    /// a response.
    pub async fn post_rotating<T, F>(
        &self,
        endpoint: &str,
        clients: &[ClientKind],
        body: &Value,
        timeout: Duration,
        extract: F,
    ) -> Result<T, ProviderError>
    where
        F: Fn(&Value) -> Result<T, ProviderError>,
    {
        if clients.is_empty() {
            return Err(ProviderError::NotConfigured(format!(
                "no clients configured for {}",
                endpoint
            )));
        }

        for (idx, kind) in clients.iter().enumerate() {
            let profile = kind.profile();
            log::debug!(
                "[{}/{}] Trying {} as {} {}",
                idx + 1,
                clients.len(),
                endpoint,
                profile.name,
                profile.version
            );

            let result = self
                .post(endpoint, profile, body.clone(), timeout)
                .await
                .and_then(|data| extract(&data));

            match result {
                Ok(value) => {
                    if idx > 0 {
                        log::info!("{} succeeded as {}", endpoint, profile.name);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_rotatable() => {
                    log::warn!(
                        "[{}/{}] {} as {} failed: {}",
                        idx + 1,
                        clients.len(),
                        endpoint,
                        profile.name,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }

        log::error!(
            "All {} client identities failed for {}",
            clients.len(),
            endpoint
        );
        Err(ProviderError::AllEndpointsFailed {
            attempts: clients.len(),
        })
    }
}
