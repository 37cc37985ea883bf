use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::client::InnerTubeClient;
use super::config::{YouTubeConfig, SONGS_FILTER_PARAMS};
use super::parser;
use crate::audio::format::select_best;
use crate::errors::ProviderError;
use crate::models::{StreamInfo, Track};
use crate::providers::traits::{raw_id, CatalogProvider};
use crate::providers::ProviderKind;

/// Radio mix seeded from one track.
const RADIO_PREFIX: &str = "RDAMVM";

pub struct YouTubeProvider {
    client: InnerTubeClient,
}

impl YouTubeProvider {
    pub fn new(config: YouTubeConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: InnerTubeClient::new(config)?,
        })
    }

    fn config(&self) -> &YouTubeConfig {
        self.client.config()
    }

    fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.config().search_timeout_secs)
    }

    /// Every identity of the slowest operation timing out in turn.
    fn rotation_budget(&self) -> Duration {
        let config = self.config();
        let player = Duration::from_secs(config.player_timeout_secs)
            * config.stream_clients.len() as u32;
        let search = self.search_timeout()
            * config.search_clients.len().max(config.browse_clients.len()) as u32;
        player.max(search)
    }

    async fn queue(
        &self,
        body: serde_json::Value,
        skip_id: Option<String>,
        limit: usize,
    ) -> Result<Vec<Track>, ProviderError> {
        let clients = self.config().browse_clients.clone();
        self.client
            .post_rotating("next", &clients, &body, self.search_timeout(), |data| {
                let tracks: Vec<Track> = parser::parse_playlist_panel(data, limit + 1)
                    .into_iter()
                    .filter(|t| Some(&t.id) != skip_id.as_ref())
                    .take(limit)
                    .collect();
                Ok(tracks)
            })
            .await
    }
}

#[async_trait]
impl CatalogProvider for YouTubeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::YouTube
    }

    fn name(&self) -> &str {
        "YouTube Music"
    }

    fn max_call_duration(&self) -> Option<Duration> {
        Some(self.rotation_budget())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let body = json!({
            "query": query,
            "params": SONGS_FILTER_PARAMS,
        });
        let clients = self.config().search_clients.clone();

        self.client
            .post_rotating("search", &clients, &body, self.search_timeout(), |data| {
                Ok(parser::parse_search(data, limit))
            })
            .await
    }

    async fn get_stream_url(&self, track_id: &str) -> Result<StreamInfo, ProviderError> {
        let video_id = raw_id(ProviderKind::YouTube, track_id)?;
        let body = json!({
            "videoId": video_id,
            "contentCheckOk": true,
            "racyCheckOk": true,
        });
        let clients = self.config().stream_clients.clone();
        let timeout = Duration::from_secs(self.config().player_timeout_secs);

        let info = self
            .client
            .post_rotating("player", &clients, &body, timeout, |data| {
                let formats = parser::parse_player_formats(data)?;
                select_best(&formats)
                    .cloned()
                    .map(StreamInfo::from)
                    .ok_or_else(|| {
                        ProviderError::NoUsableFormat(format!(
                            "{} formats, none audio-only with a direct url",
                            formats.len()
                        ))
                    })
            })
            .await?;

        log::info!(
            "Resolved {} to {} @ {:?} bps",
            video_id,
            info.mime_type.as_deref().unwrap_or("?"),
            info.bitrate
        );
        Ok(info)
    }

    async fn get_trending(&self, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let playlist_id = self.config().trending_playlist_id.clone();
        self.get_playlist(&playlist_id, limit).await
    }

    async fn get_related(&self, track_id: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let video_id = raw_id(ProviderKind::YouTube, track_id)?;
        let body = json!({
            "videoId": video_id,
            "playlistId": format!("{}{}", RADIO_PREFIX, video_id),
            "isAudioOnly": true,
        });
        self.queue(body, Some(ProviderKind::YouTube.qualify(video_id)), limit)
            .await
    }

    async fn get_playlist(
        &self,
        playlist_id: &str,
        limit: usize,
    ) -> Result<Vec<Track>, ProviderError> {
        let id = raw_id(ProviderKind::YouTube, playlist_id)?;
        // Browse ids of playlists carry a "VL" prefix the queue endpoint rejects.
        let id = id.strip_prefix("VL").unwrap_or(id);
        let body = json!({
            "playlistId": id,
            "isAudioOnly": true,
        });
        self.queue(body, None, limit).await
    }
}
