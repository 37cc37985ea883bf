use serde_json::Value;

use crate::models::Track;
use crate::providers::ProviderKind;
use crate::util::JsonNav;

pub fn parse_track(track: &Value) -> Option<Track> {
    if track.key("is_local").and_then(|v| v.as_bool()) == Some(true) {
        return None;
    }

    let id = track.key("id").text().filter(|id| !id.is_empty())?;
    let title = track.key("name").text()?;

    let artists: Vec<&str> = track
        .key("artists")
        .items()
        .iter()
        .filter_map(|a| a.key("name").text())
        .collect();

    Some(Track {
        id: ProviderKind::Spotify.qualify(id),
        title: title.to_string(),
        artist: if artists.is_empty() {
            "Unknown Artist".to_string()
        } else {
            artists.join(", ")
        },
        album: track
            .key("album")
            .key("name")
            .text()
            .map(str::to_string),
        duration_ms: track.key("duration_ms").uint().unwrap_or(0),
        // Album art is listed largest first.
        thumbnail_url: track
            .key("album")
            .key("images")
            .idx(0)
            .key("url")
            .text()
            .map(str::to_string),
        provider: ProviderKind::Spotify,
        external_url: track
            .key("external_urls")
            .key("spotify")
            .text()
            .map(str::to_string),
    })
}

/// Track objects, unwrapping playlist entries (`{added_at, track: {...}}`).
pub fn parse_tracks(items: &[Value], limit: usize) -> Vec<Track> {
    items
        .iter()
        .filter_map(|item| match item.get("track") {
            Some(inner) if inner.is_object() => parse_track(inner),
            Some(_) => None,
            None => parse_track(item),
        })
        .take(limit)
        .collect()
}
