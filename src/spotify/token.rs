use chrono::{DateTime, TimeDelta, Utc};
use std::future::Future;
use tokio::sync::Mutex;

use crate::errors::ProviderError;

/// Upper bound on a reported `expires_in`, keeps the arithmetic in range.
const MAX_LIFETIME_SECONDS: u64 = 10 * 365 * 24 * 3600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(value: impl Into<String>, expires_in_secs: u64) -> Self {
        Self::issued_at(value, expires_in_secs, Utc::now())
    }

    pub fn issued_at(value: impl Into<String>, expires_in_secs: u64, now: DateTime<Utc>) -> Self {
        let lifetime = TimeDelta::try_seconds(expires_in_secs.min(MAX_LIFETIME_SECONDS) as i64)
            .unwrap_or(TimeDelta::zero());
        Self {
            value: value.into(),
            expires_at: now.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn expires_at_epoch_ms(&self) -> i64 {
        self.expires_at.timestamp_millis()
    }

    /// Usable while `now < expires_at - margin`.
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        match self.expires_at.checked_sub_signed(margin) {
            Some(deadline) => now < deadline,
            None => false,
        }
    }
}

/// Lazily refreshed client-credentials token.
///
/// The lock is held across the refresh so concurrent callers wait for one
/// exchange instead of each starting their own.
pub struct TokenCache {
    token: Mutex<Option<CachedToken>>,
    margin: TimeDelta,
}

impl TokenCache {
    pub fn new(margin_secs: u64) -> Self {
        Self {
            token: Mutex::new(None),
            margin: TimeDelta::try_seconds(margin_secs.min(MAX_LIFETIME_SECONDS) as i64)
                .unwrap_or(TimeDelta::zero()),
        }
    }

    /// Returns the cached value, or runs `refresh` and caches its result.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<String, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedToken, ProviderError>>,
    {
        let mut guard = self.token.lock().await;

        if let Some(token) = guard.as_ref() {
            if token.is_valid_at(Utc::now(), self.margin) {
                return Ok(token.value.clone());
            }
            log::debug!("Access token expired at {}", token.expires_at);
        }

        let token = refresh().await?;
        log::info!("Fetched access token (expires {})", token.expires_at);
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }

    pub async fn current(&self) -> Option<CachedToken> {
        self.token.lock().await.clone()
    }
}
