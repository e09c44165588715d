use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::domain::models::geo::{AddressSuggestion, GeocodedAddress};

pub const GEOCODE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const SUGGESTION_TTL: Duration = Duration::from_secs(60 * 60);
pub const COVERAGE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Clone, Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self { value, expires_at: Instant::now() + ttl }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// In-memory key/value cache with per-entry expiry.
pub struct TtlCache<V: Clone> {
    store: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
    default_ttl: Duration,
}

impl<V: Clone> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), default_ttl: self.default_ttl }
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self { store: Arc::new(RwLock::new(HashMap::new())), default_ttl }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let store = self.store.read().await;
        if let Some(entry) = store.get(key) {
            if !entry.is_expired() {
                debug!("Cache HIT for {}", key);
                return Some(entry.value.clone());
            }
            debug!("Cache EXPIRED for {}", key);
        } else {
            debug!("Cache MISS for {}", key);
        }
        None
    }

    pub async fn insert(&self, key: String, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl).await;
    }

    /// A zero TTL drops the entry on the floor, which turns the cache off
    /// without branching at every call site.
    pub async fn insert_with_ttl(&self, key: String, value: V, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let mut store = self.store.write().await;
        store.insert(key, CacheEntry::new(value, ttl));
    }

    pub async fn remove_expired(&self) -> usize {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired());
        before - store.len()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
    }
}

/// Shared cache for the geo lookups the engine repeats constantly:
/// postcode resolutions, address suggestions and coverage matches.
///
/// Geocode entries store the provider's answer including "postcode does not
/// exist", so dead postcodes are not re-queried for the full TTL.
pub struct GeoCache {
    geocode: TtlCache<Option<GeocodedAddress>>,
    suggestions: TtlCache<Vec<AddressSuggestion>>,
    coverage: TtlCache<Vec<Uuid>>,
}

impl GeoCache {
    pub fn new() -> Self {
        Self::with_ttls(GEOCODE_TTL, SUGGESTION_TTL, COVERAGE_TTL)
    }

    pub fn with_ttls(
        geocode_ttl: Duration,
        suggestion_ttl: Duration,
        coverage_ttl: Duration,
    ) -> Self {
        Self {
            geocode: TtlCache::new(geocode_ttl),
            suggestions: TtlCache::new(suggestion_ttl),
            coverage: TtlCache::new(coverage_ttl),
        }
    }

    /// A cache that never stores anything; every lookup misses.
    pub fn disabled() -> Self {
        Self::with_ttls(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    pub fn coverage_key(postcode: &str, service_id: Option<Uuid>) -> String {
        match service_id {
            Some(id) => format!("match:{}:{}", postcode, id),
            None => format!("match:{}:all", postcode),
        }
    }

    pub async fn get_geocode(&self, key: &str) -> Option<Option<GeocodedAddress>> {
        self.geocode.get(key).await
    }

    pub async fn put_geocode(&self, key: &str, value: Option<GeocodedAddress>) {
        self.geocode.insert(key.to_string(), value).await;
    }

    pub async fn get_suggestions(&self, key: &str) -> Option<Vec<AddressSuggestion>> {
        self.suggestions.get(key).await
    }

    pub async fn put_suggestions(&self, key: &str, value: Vec<AddressSuggestion>) {
        self.suggestions.insert(key.to_string(), value).await;
    }

    pub async fn get_coverage(&self, key: &str) -> Option<Vec<Uuid>> {
        self.coverage.get(key).await
    }

    pub async fn put_coverage(&self, key: &str, value: Vec<Uuid>) {
        self.coverage.insert(key.to_string(), value).await;
    }

    pub async fn remove_expired(&self) -> usize {
        self.geocode.remove_expired().await
            + self.suggestions.remove_expired().await
            + self.coverage.remove_expired().await
    }

    pub async fn clear(&self) {
        self.geocode.clear().await;
        self.suggestions.clear().await;
        self.coverage.clear().await;
    }
}

impl Default for GeoCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodically evict expired entries so an idle engine does not hold
/// stale geodata forever.
pub fn spawn_sweeper(cache: Arc<GeoCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let evicted = cache.remove_expired().await;
            if evicted > 0 {
                debug!("Cache sweep evicted {} entries", evicted);
            }
        }
    })
}
