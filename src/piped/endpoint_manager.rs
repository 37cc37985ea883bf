use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::config::*;
use crate::errors::ProviderError;

/// Interchangeable mirror base URLs plus a shared rotation cursor.
///
/// The cursor moves on every attempt regardless of outcome, so consecutive
/// requests land on different mirrors.
pub struct EndpointPool {
    endpoints: Vec<String>,
    cursor: Mutex<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct PipedInstance {
    #[serde(default)]
    name: String,
    #[serde(default)]
    api_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct InstanceCache {
    timestamp: i64,
    instances: Vec<String>,
}

impl EndpointPool {
    /// Builds a pool with a random starting cursor.
    pub fn new(endpoints: Vec<String>) -> Self {
        let start = if endpoints.is_empty() {
            0
        } else {
            rand::rng().random_range(0..endpoints.len())
        };
        Self::with_cursor(endpoints, start)
    }

    pub fn with_cursor(endpoints: Vec<String>, start: usize) -> Self {
        let endpoints: Vec<String> = endpoints
            .into_iter()
            .map(|e| e.trim().trim_end_matches('/').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        let start = if endpoints.is_empty() {
            0
        } else {
            start % endpoints.len()
        };

        Self {
            endpoints,
            cursor: Mutex::new(start),
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn cursor(&self) -> usize {
        *self.cursor.lock()
    }

    /// Returns the index at the cursor and moves the cursor one step.
    pub fn advance(&self) -> Option<usize> {
        if self.endpoints.is_empty() {
            return None;
        }
        let mut cursor = self.cursor.lock();
        let current = *cursor;
        *cursor = (current + 1) % self.endpoints.len();
        Some(current)
    }

    /// Mirrors to try for one logical request, each exactly once, starting
    /// at the cursor.
    pub fn attempt_order(&self) -> Vec<String> {
        let Some(start) = self.advance() else {
            return Vec::new();
        };
        let len = self.endpoints.len();
        (0..len)
            .map(|i| self.endpoints[(start + i) % len].clone())
            .collect()
    }

    /// Resolves the mirror list for a config: discovered (and cached) when
    /// discovery is on, otherwise the static list.
    pub async fn from_config(config: &PipedConfig) -> Self {
        if !config.discover_instances {
            return Self::new(config.instances.clone());
        }

        let instances = load_instances_with_cache(config, &get_cache_file_path()).await;
        Self::new(instances)
    }
}

/// Fresh cache, then network, then expired cache, then the configured list.
pub async fn load_instances_with_cache(config: &PipedConfig, cache_path: &Path) -> Vec<String> {
    let cached = load_from_cache(cache_path);

    if let Some(cache) = &cached {
        let age = Utc::now().timestamp().saturating_sub(cache.timestamp);
        if age >= 0 && (age as u64) < CACHE_TTL_SECONDS && !cache.instances.is_empty() {
            log::info!(
                "Loaded {} Piped instances from cache (age: {}s)",
                cache.instances.len(),
                age
            );
            return cache.instances.clone();
        }
        log::info!("Piped instance cache expired (age: {}s), refreshing", age);
    }

    match fetch_instances(&config.instances_url, config.timeout_secs).await {
        Ok(instances) => {
            log::info!("Discovered {} Piped instances", instances.len());
            if let Err(e) = save_to_cache(cache_path, &instances) {
                log::warn!("Failed to write Piped instance cache: {}", e);
            }
            instances
        }
        Err(e) => {
            log::warn!("Piped instance discovery failed: {}", e);
            match cached {
                Some(cache) if !cache.instances.is_empty() => {
                    log::warn!("Using expired Piped instance cache as fallback");
                    cache.instances
                }
                _ => config.instances.clone(),
            }
        }
    }
}

async fn fetch_instances(url: &str, timeout_secs: u64) -> Result<Vec<String>, ProviderError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::rejected(status.as_u16(), "instance list"));
    }

    let text = response.text().await?;
    parse_instances_json(&text)
}

fn parse_instances_json(text: &str) -> Result<Vec<String>, ProviderError> {
    let entries: Vec<PipedInstance> = serde_json::from_str(text)?;

    let instances: Vec<String> = entries
        .into_iter()
        .filter(|i| i.api_url.starts_with("http"))
        .map(|i| {
            log::debug!("Piped instance {} at {}", i.name, i.api_url);
            i.api_url.trim_end_matches('/').to_string()
        })
        .collect();

    if instances.is_empty() {
        return Err(ProviderError::Parse(
            "No instances found in response".to_string(),
        ));
    }
    Ok(instances)
}

fn load_from_cache(path: &Path) -> Option<InstanceCache> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn save_to_cache(path: &Path, instances: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let cache = InstanceCache {
        timestamp: Utc::now().timestamp(),
        instances: instances.to_vec(),
    };
    let json = serde_json::to_string_pretty(&cache)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize, start: usize) -> EndpointPool {
        EndpointPool::with_cursor(
            (0..n).map(|i| format!("https://m{}.example/", i)).collect(),
            start,
        )
    }

    #[test]
    fn test_cursor_wraps() {
        let pool = pool(3, 2);
        assert_eq!(pool.advance(), Some(2));
        assert_eq!(pool.advance(), Some(0));
        assert_eq!(pool.cursor(), 1);
    }

    #[test]
    fn test_attempt_order_covers_every_mirror_once() {
        let pool = pool(4, 1);
        let order = pool.attempt_order();
        assert_eq!(
            order,
            vec![
                "https://m1.example",
                "https://m2.example",
                "https://m3.example",
                "https://m0.example"
            ]
        );
        // The next request starts one further along.
        assert_eq!(pool.attempt_order()[0], "https://m2.example");
    }

    #[test]
    fn test_empty_pool() {
        let pool = EndpointPool::new(vec![" ".into()]);
        assert!(pool.is_empty());
        assert_eq!(pool.advance(), None);
        assert!(pool.attempt_order().is_empty());
    }

    #[test]
    fn test_random_start_in_range() {
        for _ in 0..20 {
            let pool = EndpointPool::new(vec!["a".into(), "b".into(), "c".into()]);
            assert!(pool.cursor() < 3);
        }
    }

    #[test]
    fn test_parse_instances() {
        let text = r#"[
            {"name": "kavin.rocks", "api_url": "https://pipedapi.kavin.rocks/", "locations": "🇮🇳"},
            {"name": "broken", "api_url": ""}
        ]"#;
        assert_eq!(
            parse_instances_json(text).unwrap(),
            vec!["https://pipedapi.kavin.rocks"]
        );
        assert!(parse_instances_json("[]").is_err());
        assert!(parse_instances_json("{}").is_err());
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("piped_instances.json");
        save_to_cache(&path, &["https://cached.example".to_string()]).unwrap();

        let config = PipedConfig {
            discover_instances: true,
            instances_url: "http://127.0.0.1:9/unreachable".into(),
            ..PipedConfig::default()
        };
        let instances = load_instances_with_cache(&config, &path).await;
        assert_eq!(instances, vec!["https://cached.example"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_static_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let config = PipedConfig {
            discover_instances: true,
            instances: vec!["https://static.example".into()],
            instances_url: "http://127.0.0.1:9/unreachable".into(),
            timeout_secs: 2,
            ..PipedConfig::default()
        };
        let instances = load_instances_with_cache(&config, &path).await;
        assert_eq!(instances, vec!["https://static.example"]);
    }

    #[tokio::test]
    async fn test_expired_cache_used_when_discovery_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("piped_instances.json");
        let stale = InstanceCache {
            timestamp: Utc::now().timestamp() - CACHE_TTL_SECONDS as i64 - 10,
            instances: vec!["https://stale.example".into()],
        };
        fs::write(&path, serde_json::to_string(&stale).unwrap()).unwrap();

        let config = PipedConfig {
            discover_instances: true,
            instances_url: "http://127.0.0.1:9/unreachable".into(),
            timeout_secs: 2,
            ..PipedConfig::default()
        };
        let instances = load_instances_with_cache(&config, &path).await;
        assert_eq!(instances, vec!["https://stale.example"]);
    }
}
