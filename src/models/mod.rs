use serde::{Deserialize, Serialize};

use crate::providers::ProviderKind;

/// A playable song as returned by one catalog provider.
///
/// `id` is always provider-qualified (`"ytm:dQw4w9WgXcQ"`), so `(provider, id)`
/// routes back to exactly one provider's stream resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration_ms: u64,
    #[serde(rename = "cover_image")]
    pub thumbnail_url: Option<String>,
    pub provider: ProviderKind,
    pub external_url: Option<String>,
}

impl Track {
    /// The upstream id without the provider prefix.
    pub fn external_id(&self) -> &str {
        self.provider.strip_prefix(&self.id).unwrap_or(&self.id)
    }

    pub(crate) fn dedup_key(&self) -> (String, String) {
        (self.title.to_lowercase(), self.artist.to_lowercase())
    }
}

/// One encoded variant offered by an upstream for a single track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormatCandidate {
    pub mime_type: String,
    pub bitrate_bps: u64,
    pub url: String,
}

impl AudioFormatCandidate {
    pub fn new(mime_type: impl Into<String>, bitrate_bps: u64, url: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bitrate_bps,
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub url: String,
    /// Mime type of the chosen encoding if the upstream reported one.
    pub mime_type: Option<String>,
    pub bitrate: Option<u64>,
}

impl From<AudioFormatCandidate> for StreamInfo {
    fn from(c: AudioFormatCandidate) -> Self {
        Self {
            url: c.url,
            mime_type: Some(c.mime_type),
            bitrate: Some(c.bitrate_bps),
        }
    }
}
