use futures_util::future::join_all;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CatalogConfig;
use crate::errors::ProviderError;
use crate::models::{StreamInfo, Track};
use crate::piped::PipedProvider;
use crate::providers::traits::CatalogProvider;
use crate::providers::ProviderKind;
use crate::saavn::SaavnProvider;
use crate::spotify::SpotifyProvider;
use crate::youtube::YouTubeProvider;

/// Slack on top of a provider's own budget so its last attempt can report
/// its error before the aggregator gives up on it.
const CEILING_GRACE: Duration = Duration::from_secs(1);

/// Fans catalog queries out to every enabled provider and merges the
/// answers in provider order.
///
/// Provider failures never reach the caller: an erroring, timed-out or
/// panicking provider simply contributes nothing.
pub struct ProviderManager {
    providers: RwLock<BTreeMap<ProviderKind, Arc<dyn CatalogProvider>>>,
    enabled: RwLock<Arc<HashSet<ProviderKind>>>,
    provider_timeout: Duration,
    dedup_results: bool,
}

impl ProviderManager {
    pub fn new(provider_timeout: Duration) -> Self {
        Self {
            providers: RwLock::new(BTreeMap::new()),
            enabled: RwLock::new(Arc::new(HashSet::new())),
            provider_timeout,
            dedup_results: false,
        }
    }

    pub fn with_dedup(mut self, dedup_results: bool) -> Self {
        self.dedup_results = dedup_results;
        self
    }

    /// Builds every provider from config and enables the configured subset.
    pub async fn from_config(config: &CatalogConfig) -> Self {
        let manager =
            Self::new(config.provider_timeout()).with_dedup(config.dedup_results);

        match YouTubeProvider::new(config.youtube.clone()) {
            Ok(p) => manager.register_provider(Arc::new(p)),
            Err(e) => log::warn!("Failed to initialize YouTube provider: {}", e),
        }
        match SaavnProvider::new(&config.saavn) {
            Ok(p) => manager.register_provider(Arc::new(p)),
            Err(e) => log::warn!("Failed to initialize JioSaavn provider: {}", e),
        }
        match PipedProvider::new(&config.piped).await {
            Ok(p) => manager.register_provider(Arc::new(p)),
            Err(e) => log::warn!("Failed to initialize Piped provider: {}", e),
        }
        match SpotifyProvider::new(config.spotify.clone()) {
            Ok(p) => {
                if !p.is_configured() && config.enabled.contains(&ProviderKind::Spotify) {
                    log::warn!("Spotify is enabled but has no client credentials");
                }
                manager.register_provider(Arc::new(p));
            }
            Err(e) => log::warn!("Failed to initialize Spotify provider: {}", e),
        }

        manager.set_enabled_providers(config.enabled.iter().copied());
        manager
    }

    /// Adds (or replaces) a provider. Newly registered providers start enabled.
    pub fn register_provider(&self, provider: Arc<dyn CatalogProvider>) {
        let kind = provider.kind();
        log::info!("Registering catalog provider: {} ({})", provider.name(), kind);
        self.providers.write().insert(kind, provider);

        let mut enabled = self.enabled.write();
        let mut next = (**enabled).clone();
        next.insert(kind);
        *enabled = Arc::new(next);
    }

    pub fn get_provider(&self, kind: ProviderKind) -> Option<Arc<dyn CatalogProvider>> {
        self.providers.read().get(&kind).cloned()
    }

    /// Registered providers in enumeration order.
    pub fn list_providers(&self) -> Vec<(ProviderKind, String)> {
        self.providers
            .read()
            .iter()
            .map(|(kind, p)| (*kind, p.name().to_string()))
            .collect()
    }

    /// Replaces the enabled subset in one step.
    pub fn set_enabled_providers(&self, kinds: impl IntoIterator<Item = ProviderKind>) {
        let next: HashSet<ProviderKind> = kinds.into_iter().collect();
        let mut sorted: Vec<_> = next.iter().copied().collect();
        sorted.sort();
        log::info!("Enabled providers: {:?}", sorted);
        *self.enabled.write() = Arc::new(next);
    }

    pub fn enabled_providers(&self) -> Vec<ProviderKind> {
        let enabled = self.enabled.read().clone();
        let mut kinds: Vec<_> = enabled.iter().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn is_enabled(&self, kind: ProviderKind) -> bool {
        self.enabled.read().contains(&kind)
    }

    /// Time allowed for one call to `provider`: the configured timeout,
    /// raised to cover the provider's full rotation when that is longer.
    pub fn call_ceiling(&self, provider: &dyn CatalogProvider) -> Duration {
        match provider.max_call_duration() {
            Some(budget) => self.provider_timeout.max(budget + CEILING_GRACE),
            None => self.provider_timeout,
        }
    }

    /// Enabled providers as of now, in enumeration order.
    fn snapshot(&self) -> Vec<Arc<dyn CatalogProvider>> {
        let enabled = self.enabled.read().clone();
        self.providers
            .read()
            .iter()
            .filter(|(kind, _)| enabled.contains(*kind))
            .map(|(_, p)| p.clone())
            .collect()
    }

    async fn fan_out<F, Fut>(&self, operation: &'static str, call: F) -> Vec<Track>
    where
        F: Fn(Arc<dyn CatalogProvider>) -> Fut,
        Fut: Future<Output = Result<Vec<Track>, ProviderError>> + Send + 'static,
    {
        let providers = self.snapshot();
        if providers.is_empty() {
            log::debug!("No providers enabled for {}", operation);
            return Vec::new();
        }

        let ceilings: Vec<Duration> = providers
            .iter()
            .map(|p| self.call_ceiling(p.as_ref()))
            .collect();
        let handles: Vec<_> = providers
            .iter()
            .zip(&ceilings)
            .map(|(p, ceiling)| tokio::spawn(tokio::time::timeout(*ceiling, call(p.clone()))))
            .collect();

        let results = join_all(handles).await;

        let mut merged = Vec::new();
        for ((provider, ceiling), result) in providers.iter().zip(ceilings).zip(results) {
            match result {
                Ok(Ok(Ok(tracks))) => {
                    log::debug!("{} {}: {} results", provider.name(), operation, tracks.len());
                    merged.extend(tracks);
                }
                Ok(Ok(Err(e))) => {
                    log::warn!("{} {} failed: {}", provider.name(), operation, e);
                }
                Ok(Err(_)) => {
                    log::warn!(
                        "{} {} timed out after {:?}",
                        provider.name(),
                        operation,
                        ceiling
                    );
                }
                Err(e) => {
                    log::error!("{} {} task aborted: {}", provider.name(), operation, e);
                }
            }
        }

        if self.dedup_results {
            dedup_tracks(merged)
        } else {
            merged
        }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Vec<Track> {
        let query: Arc<str> = Arc::from(query);
        self.fan_out("search", move |provider| {
            let query = query.clone();
            async move { provider.search(&query, limit).await }
        })
        .await
    }

    pub async fn get_trending(&self, limit: usize) -> Vec<Track> {
        self.fan_out("trending", move |provider| async move {
            provider.get_trending(limit).await
        })
        .await
    }

    /// Resolves through the named provider only, enabled or not.
    pub async fn resolve_stream(
        &self,
        kind: ProviderKind,
        track_id: &str,
    ) -> Result<StreamInfo, ProviderError> {
        let provider = self
            .get_provider(kind)
            .ok_or_else(|| ProviderError::NotConfigured(format!("{} is not registered", kind)))?;

        let ceiling = self.call_ceiling(provider.as_ref());
        match tokio::time::timeout(ceiling, provider.get_stream_url(track_id)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::UpstreamUnavailable(format!(
                "{} stream resolution timed out",
                kind
            ))),
        }
    }

    pub async fn resolve_track(&self, track: &Track) -> Result<StreamInfo, ProviderError> {
        self.resolve_stream(track.provider, &track.id).await
    }

    /// Stream URL or `None`; the reason is logged.
    pub async fn get_stream_url(&self, track_id: &str, kind: ProviderKind) -> Option<String> {
        match self.resolve_stream(kind, track_id).await {
            Ok(info) => Some(info.url),
            Err(e) => {
                log::warn!("Could not resolve {} via {}: {}", track_id, kind, e);
                None
            }
        }
    }

    pub async fn get_related(&self, track: &Track, limit: usize) -> Vec<Track> {
        let Some(provider) = self.get_provider(track.provider) else {
            return Vec::new();
        };
        let call = provider.get_related(&track.id, limit);
        self.single("related", provider.as_ref(), call).await
    }

    pub async fn get_playlist(
        &self,
        kind: ProviderKind,
        playlist_id: &str,
        limit: usize,
    ) -> Vec<Track> {
        let Some(provider) = self.get_provider(kind) else {
            return Vec::new();
        };
        let call = provider.get_playlist(playlist_id, limit);
        self.single("playlist", provider.as_ref(), call).await
    }

    async fn single<Fut>(
        &self,
        operation: &str,
        provider: &dyn CatalogProvider,
        call: Fut,
    ) -> Vec<Track>
    where
        Fut: Future<Output = Result<Vec<Track>, ProviderError>>,
    {
        let kind = provider.kind();
        match tokio::time::timeout(self.call_ceiling(provider), call).await {
            Ok(Ok(tracks)) => tracks,
            Ok(Err(e)) => {
                log::warn!("{} {} failed: {}", kind, operation, e);
                Vec::new()
            }
            Err(_) => {
                log::warn!("{} {} timed out", kind, operation);
                Vec::new()
            }
        }
    }
}

/// Keeps the first track per `(title, artist)`, case-insensitively.
pub fn dedup_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.dedup_key()))
        .collect()
}
