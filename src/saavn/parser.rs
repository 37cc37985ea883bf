use serde_json::Value;

use crate::models::{AudioFormatCandidate, Track};
use crate::providers::ProviderKind;
use crate::util::json::array_or_wrapped;
use crate::util::{parse_loose_seconds, unescape_html, JsonNav};

/// Download links are AAC in an MP4 container.
pub const DOWNLOAD_MIME: &str = "audio/mp4";

pub fn parse_song(song: &Value) -> Option<Track> {
    let id = song.key("id").text().filter(|id| !id.is_empty())?;
    let title = song
        .key("name")
        .text()
        .or_else(|| song.key("title").text())?;

    Some(Track {
        id: ProviderKind::Saavn.qualify(id),
        title: unescape_html(title.trim()),
        artist: parse_artists(song),
        album: song
            .key("album")
            .key("name")
            .text()
            .or_else(|| song.key("album").text())
            .filter(|a| !a.is_empty())
            .map(unescape_html),
        duration_ms: song.key("duration").map(parse_loose_seconds).unwrap_or(0),
        thumbnail_url: song
            .key("image")
            .last()
            .key("url")
            .or_else(|| song.key("image").last().key("link"))
            .text()
            .or_else(|| song.key("image").text())
            .map(str::to_string),
        provider: ProviderKind::Saavn,
        external_url: song.key("url").text().map(str::to_string),
    })
}

/// `artists.primary[].name`, falling back to the flat `primaryArtists` string.
fn parse_artists(song: &Value) -> String {
    let names: Vec<&str> = song
        .key("artists")
        .key("primary")
        .items()
        .iter()
        .filter_map(|a| a.key("name").text())
        .collect();

    let joined = if names.is_empty() {
        song.key("primaryArtists").text().unwrap_or_default().to_string()
    } else {
        names.join(", ")
    };

    if joined.trim().is_empty() {
        "Unknown Artist".to_string()
    } else {
        unescape_html(joined.trim())
    }
}

/// Songs from a bare array, `{results: [...]}` or `{songs: [...]}`.
pub fn parse_songs(data: &Value, limit: usize) -> Vec<Track> {
    let list = match array_or_wrapped(data, "results") {
        [] => array_or_wrapped(data, "songs"),
        list => list,
    };

    list.iter().filter_map(parse_song).take(limit).collect()
}

/// `"320kbps"` -> 320000.
pub fn quality_to_bps(quality: &str) -> u64 {
    let digits: String = quality
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u64>().map(|k| k * 1000).unwrap_or(0)
}

pub fn parse_download_urls(song: &Value) -> Vec<AudioFormatCandidate> {
    song.key("downloadUrl")
        .items()
        .iter()
        .filter_map(|entry| {
            let url = entry
                .key("url")
                .or_else(|| entry.key("link"))
                .text()
                .filter(|u| !u.is_empty())?;
            let bitrate = entry.key("quality").text().map(quality_to_bps).unwrap_or(0);
            Some(AudioFormatCandidate::new(DOWNLOAD_MIME, bitrate, url))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quality_to_bps() {
        assert_eq!(quality_to_bps("320kbps"), 320_000);
        assert_eq!(quality_to_bps("12kbps"), 12_000);
        assert_eq!(quality_to_bps("high"), 0);
    }

    #[test]
    fn test_parse_song() {
        let song = json!({
            "id": "OsnRVUxJ",
            "name": "Tum Hi Ho",
            "duration": "262",
            "album": {"name": "Aashiqui 2"},
            "artists": {"primary": [{"name": "Arijit Singh"}, {"name": "Mithoon"}]},
            "image": [{"quality": "50x50", "url": "s"}, {"quality": "500x500", "url": "l"}],
            "url": "https://www.jiosaavn.com/song/tum-hi-ho/OsnRVUxJ"
        });
        let track = parse_song(&song).unwrap();
        assert_eq!(track.id, "saavn:OsnRVUxJ");
        assert_eq!(track.artist, "Arijit Singh, Mithoon");
        assert_eq!(track.album.as_deref(), Some("Aashiqui 2"));
        assert_eq!(track.duration_ms, 262_000);
        assert_eq!(track.thumbnail_url.as_deref(), Some("l"));
    }

    #[test]
    fn test_legacy_shape_and_entities() {
        let song = json!({
            "id": "abc",
            "title": "Rock &amp; Roll",
            "primaryArtists": "A &amp; B",
            "album": "",
            "image": "https://c.example/x.jpg"
        });
        let track = parse_song(&song).unwrap();
        assert_eq!(track.title, "Rock & Roll");
        assert_eq!(track.artist, "A & B");
        assert_eq!(track.album, None);
        assert_eq!(track.duration_ms, 0);
        assert_eq!(track.thumbnail_url.as_deref(), Some("https://c.example/x.jpg"));
    }

    #[test]
    fn test_parse_songs_wrappers() {
        let songs = json!([{"id": "1", "name": "A"}, {"name": "no id"}, {"id": "2", "name": "B"}]);
        assert_eq!(parse_songs(&songs, 10).len(), 2);
        assert_eq!(parse_songs(&json!({"results": songs.clone()}), 1).len(), 1);
        assert_eq!(parse_songs(&json!({"songs": songs}), 10).len(), 2);
    }

    #[test]
    fn test_download_candidates() {
        let song = json!({"downloadUrl": [
            {"quality": "96kbps", "url": "https://aac.example/96.mp4"},
            {"quality": "320kbps", "url": "https://aac.example/320.mp4"},
            {"quality": "160kbps", "url": ""}
        ]});
        let formats = parse_download_urls(&song);
        assert_eq!(formats.len(), 2);
        assert_eq!(formats[1].bitrate_bps, 320_000);
        assert_eq!(formats[1].mime_type, "audio/mp4");
    }
}
