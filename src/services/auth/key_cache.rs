//! Time-bounded memo of the provider's key set.
//!
//! Readers clone an `Arc<JwkSet>` under a short read lock; a refresh fetches
//! outside any lock and swaps the whole set in one write. Nobody observes a
//! half updated set and the lock is never held across an `.await`.
//!
//! Forced refreshes (an unknown `kid`) are spaced at least
//! `min_refresh_interval` apart. Anyone can mint a token with a made-up `kid`,
//! and the provider rate-limits its JWKS endpoint.
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;

use crate::services::auth::jwks::{KeySetError, KeySource};

#[derive(Debug, Clone)]
struct Snapshot {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

#[derive(Debug, Default)]
struct State {
    snapshot: Option<Snapshot>,
    last_forced: Option<Instant>,
}

/// Keys handed to the verifier, plus whether they were fetched by this call.
#[derive(Debug, Clone)]
pub struct Keys {
    pub set: Arc<JwkSet>,
    pub fetched_now: bool,
}

pub struct KeyCache {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    min_refresh_interval: Duration,
    state: RwLock<State>,
}

impl std::fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCache")
            .field("source", &self.source.location())
            .field("ttl", &self.ttl)
            .field("min_refresh_interval", &self.min_refresh_interval)
            .finish()
    }
}

impl KeyCache {
    /// A zero `ttl` disables memoization: every call goes to the source.
    pub fn new(source: Arc<dyn KeySource>, ttl: Duration, min_refresh_interval: Duration) -> Self {
        Self {
            source,
            ttl,
            min_refresh_interval,
            state: RwLock::new(State::default()),
        }
    }

    /// Cached keys if still within the TTL, otherwise a fresh fetch.
    pub async fn get(&self) -> Result<Keys, KeySetError> {
        if let Some(set) = self.cached() {
            return Ok(Keys {
                set,
                fetched_now: false,
            });
        }

        let set = self.refresh().await?;
        Ok(Keys {
            set,
            fetched_now: true,
        })
    }

    /// Refetch ahead of the TTL, at most once per `min_refresh_interval`.
    ///
    /// `Ok(None)` when a forced refresh already ran within the interval.
    pub async fn force_refresh(&self) -> Result<Option<Arc<JwkSet>>, KeySetError> {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            if state
                .last_forced
                .is_some_and(|at| now.duration_since(at) < self.min_refresh_interval)
            {
                return Ok(None);
            }
            // claimed before fetching so concurrent callers don't all go out
            state.last_forced = Some(now);
        }

        self.refresh().await.map(Some)
    }

    /// Fetch and replace the cached set. On failure the previous set stays.
    async fn refresh(&self) -> Result<Arc<JwkSet>, KeySetError> {
        let set = match self.source.fetch().await {
            Ok(set) => Arc::new(set),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    source = self.source.location(),
                    "failed to fetch signing keys"
                );
                return Err(err);
            }
        };

        tracing::debug!(
            keys = set.keys.len(),
            source = self.source.location(),
            "signing keys refreshed"
        );

        if !self.ttl.is_zero() {
            let snapshot = Snapshot {
                keys: Arc::clone(&set),
                fetched_at: Instant::now(),
            };
            self.state
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .snapshot = Some(snapshot);
        }

        Ok(set)
    }

    fn cached(&self) -> Option<Arc<JwkSet>> {
        if self.ttl.is_zero() {
            return None;
        }

        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);

        guard
            .snapshot
            .as_ref()
            .filter(|s| s.fetched_at.elapsed() < self.ttl)
            .map(|s| Arc::clone(&s.keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::testing::{
        FailingKeySource, StaticKeySource, empty_jwks, fixture_jwks,
    };

    const INTERVAL: Duration = Duration::from_secs(30);

    #[tokio::test]
    async fn keys_are_reused_within_ttl() {
        let source = Arc::new(StaticKeySource::new(fixture_jwks()));
        let cache = KeyCache::new(source.clone(), Duration::from_secs(60), INTERVAL);

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert!(first.fetched_now);
        assert!(!second.fetched_now);
        assert!(Arc::ptr_eq(&first.set, &second.set));
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn keys_are_refetched_once_the_ttl_elapses() {
        let source = Arc::new(StaticKeySource::new(fixture_jwks()));
        let cache = KeyCache::new(source.clone(), Duration::from_millis(50), INTERVAL);

        assert!(cache.get().await.unwrap().fetched_now);
        assert!(!cache.get().await.unwrap().fetched_now);

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(cache.get().await.unwrap().fetched_now);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn zero_ttl_fetches_every_time() {
        let source = Arc::new(StaticKeySource::new(fixture_jwks()));
        let cache = KeyCache::new(source.clone(), Duration::ZERO, INTERVAL);

        assert!(cache.get().await.unwrap().fetched_now);
        assert!(cache.get().await.unwrap().fetched_now);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn forced_refresh_swaps_in_the_new_set() {
        let source = Arc::new(StaticKeySource::new(empty_jwks()));
        let cache = KeyCache::new(source.clone(), Duration::from_secs(60), INTERVAL);

        assert!(cache.get().await.unwrap().set.keys.is_empty());

        source.replace(fixture_jwks());
        // still served from the memo
        assert!(cache.get().await.unwrap().set.keys.is_empty());

        let refreshed = cache.force_refresh().await.unwrap().unwrap();
        assert_eq!(refreshed.keys.len(), 1);
        assert_eq!(cache.get().await.unwrap().set.keys.len(), 1);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn forced_refreshes_are_spaced_out() {
        let source = Arc::new(StaticKeySource::new(fixture_jwks()));
        let cache = KeyCache::new(source.clone(), Duration::from_secs(60), INTERVAL);

        assert!(cache.force_refresh().await.unwrap().is_some());
        for _ in 0..10 {
            assert!(cache.force_refresh().await.unwrap().is_none());
        }
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn forced_refresh_allowed_again_after_the_interval() {
        let source = Arc::new(StaticKeySource::new(fixture_jwks()));
        let cache = KeyCache::new(
            source.clone(),
            Duration::from_secs(60),
            Duration::from_millis(50),
        );

        assert!(cache.force_refresh().await.unwrap().is_some());
        assert!(cache.force_refresh().await.unwrap().is_none());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(cache.force_refresh().await.unwrap().is_some());
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_is_reported() {
        let cache = KeyCache::new(Arc::new(FailingKeySource), Duration::from_secs(60), INTERVAL);
        assert!(matches!(
            cache.get().await,
            Err(KeySetError::Status(503))
        ));
    }
}
