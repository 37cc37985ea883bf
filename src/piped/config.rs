use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const INSTANCES_URL: &str = "https://piped-instances.kavin.rocks/";
pub const CACHE_TTL_SECONDS: u64 = 86400; // 24 hours
pub const REQUEST_TIMEOUT_SECONDS: u64 = 8;

pub const DEFAULT_INSTANCES: &[&str] = &[
    "https://pipedapi.kavin.rocks",
    "https://pipedapi.adminforge.de",
    "https://api.piped.private.coffee",
    "https://pipedapi.reallyaweso.me",
    "https://pipedapi.leptons.xyz",
];

pub fn get_cache_file_path() -> PathBuf {
    crate::config::get_config_dir().join("piped_instances.json")
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipedConfig {
    /// Mirror API base URLs, tried in order starting at a random cursor.
    pub instances: Vec<String>,
    /// Fetch the public instance list instead of relying on `instances` alone.
    pub discover_instances: bool,
    pub instances_url: String,
    pub region: String,
    pub timeout_secs: u64,
}

impl Default for PipedConfig {
    fn default() -> Self {
        Self {
            instances: DEFAULT_INSTANCES.iter().map(|s| s.to_string()).collect(),
            discover_instances: false,
            instances_url: INSTANCES_URL.to_string(),
            region: "US".to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECONDS,
        }
    }
}
