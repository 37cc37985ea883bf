use async_trait::async_trait;
use std::time::Duration;

use super::client::SpotifyClient;
use super::config::{
    SpotifyConfig, MAX_PLAYLIST_LIMIT, MAX_RECOMMENDATION_LIMIT, MAX_SEARCH_LIMIT,
};
use super::parser;
use crate::errors::ProviderError;
use crate::models::{StreamInfo, Track};
use crate::providers::traits::{raw_id, CatalogProvider};
use crate::providers::ProviderKind;
use crate::util::JsonNav;

/// Preview clips are MP3.
const PREVIEW_MIME: &str = "audio/mpeg";

/// Token exchange plus request, twice when a 401 forces a refresh.
const REQUESTS_PER_CALL: u32 = 4;

pub struct SpotifyProvider {
    client: SpotifyClient,
}

impl SpotifyProvider {
    pub fn new(config: SpotifyConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: SpotifyClient::new(config)?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    fn market(&self) -> &str {
        &self.client.config().market
    }

    fn track_id(track_id: &str) -> Result<String, ProviderError> {
        let id = raw_id(ProviderKind::Spotify, track_id)?;
        SpotifyClient::extract_id("track", id)
    }
}

#[async_trait]
impl CatalogProvider for SpotifyProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Spotify
    }

    fn name(&self) -> &str {
        "Spotify"
    }

    fn max_call_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.client.config().timeout_secs) * REQUESTS_PER_CALL)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let limit = limit.min(MAX_SEARCH_LIMIT);
        let limit_param = limit.to_string();
        let data = self
            .client
            .get_json(
                "/search",
                &[
                    ("q", query),
                    ("type", "track"),
                    ("limit", limit_param.as_str()),
                    ("market", self.market()),
                ],
            )
            .await?;

        Ok(parser::parse_tracks(
            data.key("tracks").key("items").items(),
            limit,
        ))
    }

    async fn get_stream_url(&self, track_id: &str) -> Result<StreamInfo, ProviderError> {
        let id = Self::track_id(track_id)?;
        let data = self
            .client
            .get_json(&format!("/tracks/{}", id), &[("market", self.market())])
            .await?;

        let url = data
            .key("preview_url")
            .text()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                ProviderError::NoUsableFormat(format!("no preview available for {}", id))
            })?;

        Ok(StreamInfo {
            url: url.to_string(),
            mime_type: Some(PREVIEW_MIME.to_string()),
            bitrate: None,
        })
    }

    async fn get_trending(&self, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let playlist_id = self.client.config().trending_playlist_id.clone();
        self.get_playlist(&playlist_id, limit).await
    }

    async fn get_related(&self, track_id: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let id = Self::track_id(track_id)?;
        let limit = limit.min(MAX_RECOMMENDATION_LIMIT);
        let limit_param = limit.to_string();

        let data = self
            .client
            .get_json(
                "/recommendations",
                &[
                    ("seed_tracks", id.as_str()),
                    ("limit", limit_param.as_str()),
                    ("market", self.market()),
                ],
            )
            .await?;

        Ok(parser::parse_tracks(data.key("tracks").items(), limit))
    }

    async fn get_playlist(
        &self,
        playlist_id: &str,
        limit: usize,
    ) -> Result<Vec<Track>, ProviderError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let id = raw_id(ProviderKind::Spotify, playlist_id)?;
        let id = SpotifyClient::extract_id("playlist", id)?;
        let limit = limit.min(MAX_PLAYLIST_LIMIT);
        let limit_param = limit.to_string();

        let data = self
            .client
            .get_json(
                &format!("/playlists/{}/tracks", id),
                &[("limit", limit_param.as_str()), ("market", self.market())],
            )
            .await?;

        Ok(parser::parse_tracks(data.key("items").items(), limit))
    }
}
