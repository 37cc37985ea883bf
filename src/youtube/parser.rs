//! Extraction of tracks and formats from InnerTube responses.
//!
//! Renderer nesting differs between clients and changes often, so list
//! items are located by renderer name anywhere in the document instead of
//! by a fixed path.

use serde_json::Value;

use crate::errors::ProviderError;
use crate::models::{AudioFormatCandidate, Track};
use crate::providers::ProviderKind;
use crate::util::{parse_timecode, unescape_html, JsonNav};

pub const WATCH_URL: &str = "https://music.youtube.com/watch?v=";
const SEPARATOR: &str = " • ";
const ALBUM_PAGE: &str = "MUSIC_PAGE_TYPE_ALBUM";
const ARTIST_PAGE: &str = "MUSIC_PAGE_TYPE_ARTIST";

/// Collects every object stored under `key`, depth first, in document order.
pub fn find_all<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    out.push(v);
                } else {
                    find_all(v, key, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                find_all(item, key, out);
            }
        }
        _ => {}
    }
}

/// Fails unless `playabilityStatus.status` is `OK`.
pub fn check_playability(data: &Value) -> Result<(), ProviderError> {
    let status = data
        .key("playabilityStatus")
        .key("status")
        .text()
        .ok_or_else(|| ProviderError::Parse("missing playabilityStatus".to_string()))?;

    if status == "OK" {
        return Ok(());
    }

    let reason = data
        .key("playabilityStatus")
        .key("reason")
        .text()
        .unwrap_or("no reason given");
    Err(ProviderError::UpstreamRejected {
        status: None,
        reason: format!("{}: {}", status, reason),
    })
}

/// Direct-URL formats from `streamingData`, adaptive ones first.
pub fn parse_player_formats(data: &Value) -> Result<Vec<AudioFormatCandidate>, ProviderError> {
    check_playability(data)?;

    let streaming = data.key("streamingData");
    let formats = streaming
        .key("adaptiveFormats")
        .items()
        .iter()
        .chain(streaming.key("formats").items())
        .filter_map(|f| {
            // Ciphered formats need a signature we do not compute.
            let url = f.key("url").text()?;
            let mime = f.key("mimeType").text().unwrap_or_default();
            let bitrate = f
                .key("bitrate")
                .uint()
                .or_else(|| f.key("averageBitrate").uint())
                .unwrap_or(0);
            Some(AudioFormatCandidate::new(mime, bitrate, url))
        })
        .collect();

    Ok(formats)
}

pub fn parse_search(data: &Value, limit: usize) -> Vec<Track> {
    let mut renderers = Vec::new();
    find_all(data, "musicResponsiveListItemRenderer", &mut renderers);

    renderers
        .into_iter()
        .filter_map(parse_list_item)
        .take(limit)
        .collect()
}

fn parse_list_item(item: &Value) -> Option<Track> {
    let video_id = item
        .key("playlistItemData")
        .key("videoId")
        .text()
        .or_else(|| {
            item.key("overlay")
                .key("musicItemThumbnailOverlayRenderer")
                .key("content")
                .key("musicPlayButtonRenderer")
                .key("playNavigationEndpoint")
                .key("watchEndpoint")
                .key("videoId")
                .text()
        })?;

    let columns = item.key("flexColumns").items();
    let column_runs = |i: usize| {
        columns
            .get(i)
            .key("musicResponsiveListItemFlexColumnRenderer")
            .key("text")
            .key("runs")
            .items()
    };

    let title = column_runs(0)
        .iter()
        .filter_map(|r| r.key("text").text())
        .collect::<String>();
    if title.trim().is_empty() {
        return None;
    }

    let byline = parse_byline(column_runs(1));
    let fixed_duration = item
        .key("fixedColumns")
        .idx(0)
        .key("musicResponsiveListItemFixedColumnRenderer")
        .key("text")
        .runs_text()
        .map(|t| parse_timecode(&t))
        .unwrap_or(0);

    Some(Track {
        id: ProviderKind::YouTube.qualify(video_id),
        title: unescape_html(title.trim()),
        artist: byline.artist,
        album: byline.album,
        duration_ms: if byline.duration_ms > 0 {
            byline.duration_ms
        } else {
            fixed_duration
        },
        thumbnail_url: largest_thumbnail(
            item.key("thumbnail").key("musicThumbnailRenderer").key("thumbnail"),
        ),
        provider: ProviderKind::YouTube,
        external_url: Some(format!("{}{}", WATCH_URL, video_id)),
    })
}

/// Items of a `/next` queue (`playlistPanelVideoRenderer`).
pub fn parse_playlist_panel(data: &Value, limit: usize) -> Vec<Track> {
    let mut renderers = Vec::new();
    find_all(data, "playlistPanelVideoRenderer", &mut renderers);

    renderers
        .into_iter()
        .filter_map(parse_panel_item)
        .take(limit)
        .collect()
}

fn parse_panel_item(item: &Value) -> Option<Track> {
    let video_id = item.key("videoId").text()?;
    let title = item.key("title").runs_text()?;
    if title.trim().is_empty() {
        return None;
    }

    let byline = parse_byline(item.key("longBylineText").key("runs").items());
    let duration_ms = item
        .key("lengthText")
        .runs_text()
        .map(|t| parse_timecode(&t))
        .unwrap_or(byline.duration_ms);

    Some(Track {
        id: ProviderKind::YouTube.qualify(video_id),
        title: unescape_html(title.trim()),
        artist: byline.artist,
        album: byline.album,
        duration_ms,
        thumbnail_url: largest_thumbnail(item.key("thumbnail")),
        provider: ProviderKind::YouTube,
        external_url: Some(format!("{}{}", WATCH_URL, video_id)),
    })
}

#[derive(Debug, Default, PartialEq)]
struct Byline {
    artist: String,
    album: Option<String>,
    duration_ms: u64,
}

/// Splits `Artist • Album • 3:45` style runs into their parts.
fn parse_byline(runs: &[Value]) -> Byline {
    let mut groups: Vec<Vec<&Value>> = vec![Vec::new()];
    for run in runs {
        if run.key("text").text() == Some(SEPARATOR) {
            groups.push(Vec::new());
        } else if let Some(last) = groups.last_mut() {
            last.push(run);
        }
    }

    let mut byline = Byline::default();

    let artists: Vec<&str> = runs
        .iter()
        .filter(|r| page_type(r) == Some(ARTIST_PAGE))
        .filter_map(|r| r.key("text").text())
        .collect();

    for group in &groups {
        let text = group_text(group);
        if text.is_empty() {
            continue;
        }
        if group.iter().any(|r| page_type(r) == Some(ALBUM_PAGE)) {
            byline.album = Some(unescape_html(&text));
        } else if text.contains(':') && parse_timecode(&text) > 0 {
            byline.duration_ms = parse_timecode(&text);
        } else if byline.artist.is_empty() && !matches!(text.as_str(), "Song" | "Video") {
            byline.artist = unescape_html(&text);
        }
    }

    if !artists.is_empty() {
        byline.artist = unescape_html(&artists.join(", "));
    }
    if byline.artist.is_empty() {
        byline.artist = "Unknown Artist".to_string();
    }

    byline
}

fn page_type(run: &Value) -> Option<&str> {
    run.key("navigationEndpoint")
        .key("browseEndpoint")
        .key("browseEndpointContextSupportedConfigs")
        .key("browseEndpointContextMusicConfig")
        .key("pageType")
        .text()
}

fn group_text(group: &[&Value]) -> String {
    group
        .iter()
        .filter_map(|r| r.key("text").text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Thumbnails are listed smallest first.
fn largest_thumbnail(node: Option<&Value>) -> Option<String> {
    node.key("thumbnails")
        .last()
        .key("url")
        .text()
        .map(str::to_string)
}
