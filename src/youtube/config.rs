use serde::{Deserialize, Serialize};

use super::clients::ClientKind;

pub const API_BASE: &str = "https://music.youtube.com/youtubei/v1";
pub const SEARCH_TIMEOUT_SECONDS: u64 = 10;
pub const PLAYER_TIMEOUT_SECONDS: u64 = 15;
/// `params` value restricting search results to songs.
pub const SONGS_FILTER_PARAMS: &str = "EgWKAQIIAWoKEAkQBRAKEAMQBA==";
pub const TRENDING_PLAYLIST_ID: &str = "PL4fGSI1pDJn6O1LS0XSdF3RyO0Rq_LDeI";

/// Client orderings are per operation: the upstream treats search and
/// playback requests differently depending on the calling client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    pub api_base: String,
    pub hl: String,
    pub gl: String,
    pub search_clients: Vec<ClientKind>,
    pub stream_clients: Vec<ClientKind>,
    pub browse_clients: Vec<ClientKind>,
    pub trending_playlist_id: String,
    pub search_timeout_secs: u64,
    pub player_timeout_secs: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_base: API_BASE.to_string(),
            hl: "en".to_string(),
            gl: "US".to_string(),
            search_clients: vec![ClientKind::WebRemix, ClientKind::Web],
            stream_clients: vec![ClientKind::Android, ClientKind::Ios, ClientKind::Mweb],
            browse_clients: vec![ClientKind::WebRemix],
            trending_playlist_id: TRENDING_PLAYLIST_ID.to_string(),
            search_timeout_secs: SEARCH_TIMEOUT_SECONDS,
            player_timeout_secs: PLAYER_TIMEOUT_SECONDS,
        }
    }
}
