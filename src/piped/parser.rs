use serde_json::Value;

use crate::models::{AudioFormatCandidate, Track};
use crate::providers::ProviderKind;
use crate::util::json::array_or_wrapped;
use crate::util::{parse_loose_seconds, JsonNav};

pub const WATCH_URL: &str = "https://piped.video/watch?v=";

/// Video id from a Piped item url (`/watch?v=<id>`).
pub fn video_id_from_url(url: &str) -> Option<&str> {
    let id = match url.split_once("v=") {
        Some((_, rest)) => rest.split('&').next().unwrap_or(rest),
        None => url.rsplit('/').next().unwrap_or(url),
    };
    (!id.is_empty()).then_some(id)
}

/// Auto-generated "Artist - Topic" channels carry the artist name.
pub fn clean_uploader(name: &str) -> String {
    name.strip_suffix(" - Topic").unwrap_or(name).trim().to_string()
}

pub fn parse_stream_item(item: &Value) -> Option<Track> {
    if let Some(kind) = item.key("type").text() {
        if kind != "stream" {
            return None;
        }
    }

    let id = video_id_from_url(item.key("url").text()?)?;
    let title = item.key("title").text()?.trim();
    if title.is_empty() {
        return None;
    }

    let artist = item
        .key("uploaderName")
        .text()
        .map(clean_uploader)
        .unwrap_or_else(|| "Unknown Artist".to_string());

    Some(Track {
        id: ProviderKind::Piped.qualify(id),
        title: title.to_string(),
        artist,
        album: None,
        duration_ms: item.key("duration").map(parse_loose_seconds).unwrap_or(0),
        thumbnail_url: item.key("thumbnail").text().map(str::to_string),
        provider: ProviderKind::Piped,
        external_url: Some(format!("{}{}", WATCH_URL, id)),
    })
}

/// Stream items from a flat array or an `{items: [...]}` wrapper.
pub fn parse_items(data: &Value, limit: usize) -> Vec<Track> {
    array_or_wrapped(data, "items")
        .iter()
        .filter_map(parse_stream_item)
        .take(limit)
        .collect()
}

/// `relatedStreams` of a `/streams/{id}` or `/playlists/{id}` document.
pub fn parse_related(data: &Value, limit: usize) -> Vec<Track> {
    data.key("relatedStreams")
        .items()
        .iter()
        .filter_map(parse_stream_item)
        .take(limit)
        .collect()
}

pub fn parse_audio_streams(data: &Value) -> Vec<AudioFormatCandidate> {
    data.key("audioStreams")
        .items()
        .iter()
        .filter_map(|s| {
            let url = s.key("url").text().filter(|u| !u.is_empty())?;
            let mime = s.key("mimeType").text().unwrap_or_default();
            let bitrate = s.key("bitrate").uint().unwrap_or(0);
            Some(AudioFormatCandidate::new(mime, bitrate, url))
        })
        .collect()
}
