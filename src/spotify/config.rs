use serde::{Deserialize, Serialize};

pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const API_BASE: &str = "https://api.spotify.com/v1";
pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const TOKEN_EXPIRY_MARGIN_SECONDS: u64 = 60;
/// "Top 50 - Global" chart.
pub const TRENDING_PLAYLIST_ID: &str = "37i9dQZEVXbMDoHDwVN2tF";

pub const MAX_SEARCH_LIMIT: usize = 50;
pub const MAX_PLAYLIST_LIMIT: usize = 100;
pub const MAX_RECOMMENDATION_LIMIT: usize = 100;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl SpotifyCredentials {
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    #[serde(flatten)]
    pub credentials: SpotifyCredentials,
    pub token_url: String,
    pub api_base: String,
    pub market: String,
    pub trending_playlist_id: String,
    pub timeout_secs: u64,
    pub token_expiry_margin_secs: u64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            credentials: SpotifyCredentials::default(),
            token_url: TOKEN_URL.to_string(),
            api_base: API_BASE.to_string(),
            market: "US".to_string(),
            trending_playlist_id: TRENDING_PLAYLIST_ID.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECONDS,
            token_expiry_margin_secs: TOKEN_EXPIRY_MARGIN_SECONDS,
        }
    }
}
