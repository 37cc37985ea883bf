use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The upstream catalog a [`Track`](crate::models::Track) came from.
///
/// Declaration order is the provider-enumeration order used when merging
/// aggregated results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// InnerTube-style private API (YouTube Music), identity rotation.
    YouTube,
    /// JioSaavn-style JSON API.
    Saavn,
    /// Piped mirror federation, endpoint rotation.
    Piped,
    /// Client-credentials OAuth catalog (Spotify Web API).
    Spotify,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::YouTube,
        ProviderKind::Saavn,
        ProviderKind::Piped,
        ProviderKind::Spotify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::YouTube => "youtube",
            ProviderKind::Saavn => "saavn",
            ProviderKind::Piped => "piped",
            ProviderKind::Spotify => "spotify",
        }
    }

    /// Prefix used to qualify upstream ids so they never collide across providers.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ProviderKind::YouTube => "ytm",
            ProviderKind::Saavn => "saavn",
            ProviderKind::Piped => "piped",
            ProviderKind::Spotify => "spotify",
        }
    }

    pub fn qualify(&self, raw_id: &str) -> String {
        format!("{}:{}", self.id_prefix(), raw_id)
    }

    pub fn strip_prefix<'a>(&self, id: &'a str) -> Option<&'a str> {
        id.strip_prefix(self.id_prefix())
            .and_then(|rest| rest.strip_prefix(':'))
    }

    /// Finds the provider that produced a qualified id.
    pub fn from_qualified_id(id: &str) -> Option<(ProviderKind, &str)> {
        Self::ALL
            .iter()
            .find_map(|kind| kind.strip_prefix(id).map(|raw| (*kind, raw)))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "youtube" | "ytm" | "innertube" => Ok(ProviderKind::YouTube),
            "saavn" | "jiosaavn" => Ok(ProviderKind::Saavn),
            "piped" => Ok(ProviderKind::Piped),
            "spotify" => Ok(ProviderKind::Spotify),
            _ => Err(format!(
                "Invalid provider: '{}'. Valid: youtube, saavn, piped, spotify",
                s
            )),
        }
    }
}
