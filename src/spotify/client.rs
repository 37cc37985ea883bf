use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::config::SpotifyConfig;
use super::token::{CachedToken, TokenCache};
use crate::errors::ProviderError;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

pub struct SpotifyClient {
    client: Client,
    config: SpotifyConfig,
    tokens: TokenCache,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let tokens = TokenCache::new(config.token_expiry_margin_secs);

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.config.credentials.is_configured()
    }

    /// Extract an id from `spotify:<kind>:<id>`, `<kind>:<id>`, an
    /// `open.spotify.com/<kind>/<id>` URL, or a bare id.
    pub fn extract_id(kind: &str, url_or_id: &str) -> Result<String, ProviderError> {
        let trimmed = url_or_id.trim();

        let uri_prefix = format!("spotify:{}:", kind);
        let short_prefix = format!("{}:", kind);
        let path_marker = format!("open.spotify.com/{}/", kind);

        let id = if let Some(id) = trimmed.strip_prefix(&uri_prefix) {
            id
        } else if let Some(id) = trimmed.strip_prefix(&short_prefix) {
            id
        } else if let Some((_, rest)) = trimmed.split_once(&path_marker) {
            rest.split(['?', '/']).next().unwrap_or(rest)
        } else if trimmed.contains("spotify.link/") {
            return Err(ProviderError::InvalidId(
                "Share links are not supported, use the full URL".to_string(),
            ));
        } else {
            trimmed
        };

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProviderError::InvalidId(format!(
                "Could not extract {} id from: {}",
                kind, url_or_id
            )));
        }
        Ok(id.to_string())
    }

    async fn fetch_token(&self) -> Result<CachedToken, ProviderError> {
        let credentials = &self.config.credentials;
        if !credentials.is_configured() {
            return Err(ProviderError::NotConfigured(
                "Spotify client id/secret not set".to_string(),
            ));
        }

        let basic = STANDARD.encode(format!(
            "{}:{}",
            credentials.client_id.trim(),
            credentials.client_secret.trim()
        ));

        let response = self
            .client
            .post(&self.config.token_url)
            .header(AUTHORIZATION, format!("Basic {}", basic))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::warn!("Spotify token exchange failed ({}): {}", status, text);
            return Err(ProviderError::rejected(status.as_u16(), "token exchange failed"));
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken::new(token.access_token, token.expires_in))
    }

    pub async fn access_token(&self) -> Result<String, ProviderError> {
        self.tokens.get_or_refresh(|| self.fetch_token()).await
    }

    /// Authorized GET. A 401 drops the cached token and retries once.
    pub async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}{}", self.config.api_base.trim_end_matches('/'), path),
            params,
        )
        .map_err(|e| ProviderError::UpstreamUnavailable(format!("URL parse error: {}", e)))?;

        let mut retried = false;
        loop {
            let token = self.access_token().await?;
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(&token)
                .send()
                .await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && !retried {
                log::info!("Spotify returned 401 for {}, refreshing token", path);
                self.tokens.invalidate().await;
                retried = true;
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(ProviderError::rejected(
                    status.as_u16(),
                    text.chars().take(200).collect::<String>(),
                ));
            }

            return Ok(response.json::<Value>().await?);
        }
    }
}
