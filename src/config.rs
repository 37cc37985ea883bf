use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::piped::config::PipedConfig;
use crate::providers::ProviderKind;
use crate::saavn::config::SaavnConfig;
use crate::spotify::config::SpotifyConfig;
use crate::youtube::config::YouTubeConfig;

pub const APP_DIR_NAME: &str = "tunebridge";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const PROVIDER_TIMEOUT_SECONDS: u64 = 30;
pub const STREAM_TIMEOUT_SECONDS: u64 = crate::audio::source::http::STREAM_TIMEOUT_SECONDS;

pub const ENV_SPOTIFY_CLIENT_ID: &str = "TUNEBRIDGE_SPOTIFY_CLIENT_ID";
pub const ENV_SPOTIFY_CLIENT_SECRET: &str = "TUNEBRIDGE_SPOTIFY_CLIENT_SECRET";

pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn get_config_file_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE_NAME)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub timeout_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: STREAM_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Providers queried by the aggregator at startup.
    pub enabled: Vec<ProviderKind>,
    /// Ceiling on one provider's share of an aggregated call. Providers
    /// that rotate over mirrors or identities get at least their full rotation.
    pub provider_timeout_secs: u64,
    /// Drop repeated `(title, artist)` pairs from merged results.
    pub dedup_results: bool,
    pub stream: StreamConfig,
    pub youtube: YouTubeConfig,
    pub saavn: SaavnConfig,
    pub piped: PipedConfig,
    pub spotify: SpotifyConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            enabled: ProviderKind::ALL.to_vec(),
            provider_timeout_secs: PROVIDER_TIMEOUT_SECONDS,
            dedup_results: false,
            stream: StreamConfig::default(),
            youtube: YouTubeConfig::default(),
            saavn: SaavnConfig::default(),
            piped: PipedConfig::default(),
            spotify: SpotifyConfig::default(),
        }
    }
}

impl CatalogConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: CatalogConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    /// Loads the user config file if there is one, otherwise defaults.
    pub fn load_or_default() -> Result<Self> {
        let path = get_config_file_path();
        if path.exists() {
            log::info!("Loading config from {}", path.display());
            Self::load(&path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            let mut config = Self::default();
            config.apply_env();
            Ok(config)
        }
    }

    /// Credentials from the environment win over the file.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup(ENV_SPOTIFY_CLIENT_ID).filter(|v| !v.is_empty()) {
            self.spotify.credentials.client_id = id;
        }
        if let Some(secret) = lookup(ENV_SPOTIFY_CLIENT_SECRET).filter(|v| !v.is_empty()) {
            self.spotify.credentials.client_secret = secret;
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::clients::ClientKind;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.enabled, ProviderKind::ALL.to_vec());
        assert_eq!(config.youtube.search_clients[0], ClientKind::WebRemix);
        assert_eq!(config.youtube.stream_clients[0], ClientKind::Android);
        assert!(!config.spotify.credentials.is_configured());
        assert!(!config.piped.instances.is_empty());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: CatalogConfig = serde_json::from_str(
            r#"{
                "enabled": ["piped", "saavn"],
                "youtube": { "stream_clients": ["IOS", "ANDROID_MUSIC"] },
                "spotify": { "client_id": "abc", "client_secret": "xyz" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.enabled, vec![ProviderKind::Piped, ProviderKind::Saavn]);
        assert_eq!(
            config.youtube.stream_clients,
            vec![ClientKind::Ios, ClientKind::AndroidMusic]
        );
        assert_eq!(config.youtube.search_clients[0], ClientKind::WebRemix);
        assert!(config.spotify.credentials.is_configured());
        assert_eq!(config.provider_timeout_secs, PROVIDER_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_unknown_client_rejected() {
        let result: Result<CatalogConfig, _> =
            serde_json::from_str(r#"{ "youtube": { "search_clients": ["TVHTML5"] } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides_credentials() {
        let mut config = CatalogConfig::default();
        config.apply_env_from(|key| match key {
            ENV_SPOTIFY_CLIENT_ID => Some("env-id".to_string()),
            ENV_SPOTIFY_CLIENT_SECRET => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.spotify.credentials.client_id, "env-id");
        assert_eq!(config.spotify.credentials.client_secret, "");
    }
}
