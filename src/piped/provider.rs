use async_trait::async_trait;
use std::time::Duration;

use super::client::PipedClient;
use super::config::PipedConfig;
use super::parser;
use crate::audio::format::select_best;
use crate::errors::ProviderError;
use crate::models::{StreamInfo, Track};
use crate::providers::traits::{raw_id, CatalogProvider};
use crate::providers::ProviderKind;

pub struct PipedProvider {
    client: PipedClient,
    region: String,
}

impl PipedProvider {
    pub async fn new(config: &PipedConfig) -> Result<Self, ProviderError> {
        let client = PipedClient::new(config).await?;
        Ok(Self::with_client(client, &config.region))
    }

    pub fn with_client(client: PipedClient, region: &str) -> Self {
        Self {
            client,
            region: region.to_string(),
        }
    }

    pub fn client(&self) -> &PipedClient {
        &self.client
    }
}

#[async_trait]
impl CatalogProvider for PipedProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Piped
    }

    fn name(&self) -> &str {
        "Piped"
    }

    fn max_call_duration(&self) -> Option<Duration> {
        Some(self.client.rotation_budget())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        self.client
            .request(
                "/search",
                &[("q", query), ("filter", "music_songs")],
                "search",
                |data| Ok(parser::parse_items(data, limit)),
            )
            .await
    }

    async fn get_stream_url(&self, track_id: &str) -> Result<StreamInfo, ProviderError> {
        let id = raw_id(ProviderKind::Piped, track_id)?;
        let path = format!("/streams/{}", urlencoding::encode(id));

        self.client
            .request(&path, &[], "streams", |data| {
                let formats = parser::parse_audio_streams(data);
                select_best(&formats)
                    .cloned()
                    .map(StreamInfo::from)
                    .ok_or_else(|| {
                        ProviderError::NoUsableFormat(format!(
                            "{} audio streams, none audio-only",
                            formats.len()
                        ))
                    })
            })
            .await
    }

    async fn get_trending(&self, limit: usize) -> Result<Vec<Track>, ProviderError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        self.client
            .request(
                "/trending",
                &[("region", self.region.as_str())],
                "trending",
                |data| Ok(parser::parse_items(data, limit)),
            )
            .await
    }

    async fn get_related(&self, track_id: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let id = raw_id(ProviderKind::Piped, track_id)?;
        let path = format!("/streams/{}", urlencoding::encode(id));
        let own_id = ProviderKind::Piped.qualify(id);

        self.client
            .request(&path, &[], "related", |data| {
                Ok(parser::parse_related(data, limit + 1)
                    .into_iter()
                    .filter(|t| t.id != own_id)
                    .take(limit)
                    .collect())
            })
            .await
    }

    async fn get_playlist(
        &self,
        playlist_id: &str,
        limit: usize,
    ) -> Result<Vec<Track>, ProviderError> {
        let id = raw_id(ProviderKind::Piped, playlist_id)?;
        let path = format!("/playlists/{}", urlencoding::encode(id));

        self.client
            .request(&path, &[], "playlist", |data| {
                Ok(parser::parse_related(data, limit))
            })
            .await
    }
}
