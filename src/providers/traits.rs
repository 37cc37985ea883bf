use crate::errors::ProviderError;
use crate::models::{StreamInfo, Track};
use crate::providers::ProviderKind;
use async_trait::async_trait;
use std::time::Duration;

/// Capability contract every upstream catalog implements.
///
/// Methods never panic on upstream data: network errors, malformed
/// responses and empty result sets all come back as `Err` or an empty
/// `Vec`. `limit` is an upper bound, upstreams may return fewer.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Which upstream this is (also the prefix of every id it produces).
    fn kind(&self) -> ProviderKind;

    /// User-friendly name
    fn name(&self) -> &str;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError>;

    /// Resolves a playable audio URL. Accepts qualified or bare ids.
    async fn get_stream_url(&self, track_id: &str) -> Result<StreamInfo, ProviderError>;

    async fn get_trending(&self, limit: usize) -> Result<Vec<Track>, ProviderError>;

    async fn get_related(&self, track_id: &str, limit: usize) -> Result<Vec<Track>, ProviderError>;

    async fn get_playlist(&self, playlist_id: &str, limit: usize)
        -> Result<Vec<Track>, ProviderError>;

    /// Longest a single call may legitimately run, e.g. a full rotation
    /// over every mirror with its per-attempt timeout. `None` when one
    /// request bounds the call.
    fn max_call_duration(&self) -> Option<Duration> {
        None
    }
}

/// Strips this provider's prefix from a qualified id, rejecting ids that
/// belong to another provider.
pub fn raw_id(kind: ProviderKind, track_id: &str) -> Result<&str, ProviderError> {
    if let Some(raw) = kind.strip_prefix(track_id) {
        return non_empty(raw, track_id);
    }
    match ProviderKind::from_qualified_id(track_id) {
        Some((other, _)) => Err(ProviderError::InvalidId(format!(
            "{} belongs to {}, not {}",
            track_id, other, kind
        ))),
        None => non_empty(track_id, track_id),
    }
}

fn non_empty<'a>(raw: &'a str, original: &str) -> Result<&'a str, ProviderError> {
    if raw.trim().is_empty() {
        Err(ProviderError::InvalidId(original.to_string()))
    } else {
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_id() {
        assert_eq!(raw_id(ProviderKind::Saavn, "saavn:Xy12").unwrap(), "Xy12");
        assert_eq!(raw_id(ProviderKind::Saavn, "Xy12").unwrap(), "Xy12");
        assert!(matches!(
            raw_id(ProviderKind::Saavn, "ytm:Xy12"),
            Err(ProviderError::InvalidId(_))
        ));
        assert!(raw_id(ProviderKind::Piped, "piped:").is_err());
        assert!(raw_id(ProviderKind::Piped, "").is_err());
    }
}
