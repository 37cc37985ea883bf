use serde::{Deserialize, Serialize};

pub const API_BASE: &str = "https://saavn.dev/api";
pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
/// "Trending Today" editorial playlist.
pub const TRENDING_PLAYLIST_ID: &str = "110858205";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SaavnConfig {
    pub api_base: String,
    pub trending_playlist_id: String,
    pub timeout_secs: u64,
}

impl Default for SaavnConfig {
    fn default() -> Self {
        Self {
            api_base: API_BASE.to_string(),
            trending_playlist_id: TRENDING_PLAYLIST_ID.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECONDS,
        }
    }
}
