use async_trait::async_trait;
use serde_json::Value;

use super::client::SaavnClient;
use super::config::SaavnConfig;
use super::parser;
use crate::audio::format::select_best;
use crate::errors::ProviderError;
use crate::models::{StreamInfo, Track};
use crate::providers::traits::{raw_id, CatalogProvider};
use crate::providers::ProviderKind;
use crate::util::JsonNav;

pub struct SaavnProvider {
    client: SaavnClient,
    trending_playlist_id: String,
}

impl SaavnProvider {
    pub fn new(config: &SaavnConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: SaavnClient::new(config)?,
            trending_playlist_id: config.trending_playlist_id.clone(),
        })
    }

    async fn song_details(&self, id: &str) -> Result<Value, ProviderError> {
        let data = self
            .client
            .get(&format!("/songs/{}", urlencoding::encode(id)), &[])
            .await?;

        // `/songs/{id}` answers with a one-element list.
        let song = match data {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            Value::Object(_) => data,
            _ => {
                return Err(ProviderError::Parse(format!(
                    "no song details for {}",
                    id
                )))
            }
        };
        Ok(song)
    }
}

#[async_trait]
impl CatalogProvider for SaavnProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Saavn
    }

    fn name(&self) -> &str {
        "JioSaavn"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let limit_param = limit.to_string();
        let data = self
            .client
            .get(
                "/search/songs",
                &[("query", query), ("limit", limit_param.as_str())],
            )
            .await?;
        Ok(parser::parse_songs(&data, limit))
    }

    async fn get_stream_url(&self, track_id: &str) -> Result<StreamInfo, ProviderError> {
        let id = raw_id(ProviderKind::Saavn, track_id)?;
        let song = self.song_details(id).await?;

        let formats = parser::parse_download_urls(&song);
        let best = select_best(&formats).cloned().ok_or_else(|| {
            ProviderError::NoUsableFormat(format!("{} has no download urls", id))
        })?;

        log::info!(
            "Resolved {} ({}) at {} bps",
            id,
            song.key("name").text().unwrap_or("?"),
            best.bitrate_bps
        );
        Ok(best.into())
    }

    async fn get_trending(&self, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let playlist_id = self.trending_playlist_id.clone();
        self.get_playlist(&playlist_id, limit).await
    }

    async fn get_related(&self, track_id: &str, limit: usize) -> Result<Vec<Track>, ProviderError> {
        let id = raw_id(ProviderKind::Saavn, track_id)?;
        let limit_param = limit.to_string();
        let data = self
            .client
            .get(
                &format!("/songs/{}/suggestions", urlencoding::encode(id)),
                &[("limit", limit_param.as_str())],
            )
            .await?;
        Ok(parser::parse_songs(&data, limit))
    }

    async fn get_playlist(
        &self,
        playlist_id: &str,
        limit: usize,
    ) -> Result<Vec<Track>, ProviderError> {
        let id = raw_id(ProviderKind::Saavn, playlist_id)?;
        let limit_param = limit.to_string();
        let data = self
            .client
            .get("/playlists", &[("id", id), ("limit", limit_param.as_str())])
            .await?;
        Ok(parser::parse_songs(&data, limit))
    }
}
