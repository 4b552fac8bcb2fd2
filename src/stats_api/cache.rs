//! Time-bounded in-memory cache for upstream game data.
//!
//! Completed games never change, but the upstream API is slow (a full live
//! feed is several hundred KB), so translated feeds and rosters are kept for
//! a configurable TTL keyed by gamePk. Only fetched payloads are cached; the
//! WPA computation itself is cheap and always rerun.
//!
//! Lookups and fills are not atomic: two concurrent first requests for the
//! same game both go upstream and the later insert wins. Payloads are
//! immutable for completed games, so the duplicate fetch only costs latency.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Thread-safe TTL cache keyed by game id.
#[derive(Clone)]
pub struct FeedCache<V> {
    inner: Arc<RwLock<HashMap<i64, CachedValue<V>>>>,
    ttl: Duration,
}

struct CachedValue<V> {
    value: V,
    expires_at: Instant,
}

impl<V: Clone> FeedCache<V> {
    pub fn new(ttl: Duration) -> Self {
        FeedCache {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Cached value for `game_pk`, unless it is older than the TTL.
    pub async fn get(&self, game_pk: i64) -> Option<V> {
        let inner = self.inner.read().await;
        let cached = inner.get(&game_pk)?;
        if Instant::now() < cached.expires_at {
            Some(cached.value.clone())
        } else {
            None
        }
    }

    /// Store a freshly fetched value, replacing any previous entry.
    pub async fn insert(&self, game_pk: i64, value: V) {
        self.insert_with_ttl(game_pk, value, self.ttl).await;
    }

    /// Store a value that expires after `ttl` instead of the cache default.
    /// Used for fallbacks that should be retried sooner than real payloads.
    pub async fn insert_with_ttl(&self, game_pk: i64, value: V, ttl: Duration) {
        let mut inner = self.inner.write().await;
        inner.insert(
            game_pk,
            CachedValue {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drop every entry older than the TTL.
    pub async fn purge_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.len();
        let now = Instant::now();
        inner.retain(|_, c| now < c.expires_at);
        let removed = before - inner.len();
        if removed > 0 {
            debug!("FeedCache: purged {} expired entries", removed);
        }
        removed
    }
}
