//! DashMap GeoIP Cache
//!
//! Implements GeoCache using DashMap for lock-free concurrent access.

use crate::domain::entities::GeoRecord;
use crate::domain::ports::GeoCache;
use crate::domain::value_objects::CACHE_EXPIRATION;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stand-in deadline for windows too large to add to `Instant::now()`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    record: Arc<GeoRecord>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// DashMap-backed lookup cache.
///
/// Expiry is checked on every read, so a stale entry is never returned even
/// if the purge task has not yet removed it.
pub struct DashMapGeoCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    expiration: Duration,
}

impl DashMapGeoCache {
    /// Create a cache with the default expiration window.
    pub fn new() -> Self {
        Self::with_expiration(CACHE_EXPIRATION)
    }

    pub fn with_expiration(expiration: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            expiration,
        }
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    fn deadline(&self, now: Instant) -> Instant {
        now.checked_add(self.expiration).unwrap_or_else(|| now + FAR_FUTURE)
    }

    /// Start the background purge task.
    ///
    /// The task exits on its own once the cache has been dropped. Outside a
    /// tokio runtime nothing is spawned and expired entries stay in memory
    /// until `purge_expired` is called.
    pub fn start_purge(&self, interval: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no tokio runtime, geoip cache purge not started");
            return;
        };
        let entries = Arc::downgrade(&self.entries);

        handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let Some(entries) = entries.upgrade() else {
                    break;
                };

                let removed = purge(&entries, Instant::now());
                if removed > 0 {
                    tracing::debug!("geoip cache purge removed {} expired entries", removed);
                }
            }
        });
    }

    /// Remove all expired entries now.
    pub fn purge_expired(&self) -> usize {
        purge(&self.entries, Instant::now())
    }

    /// Number of physically stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn purge(entries: &DashMap<String, CacheEntry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before.saturating_sub(entries.len())
}

impl Default for DashMapGeoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoCache for DashMapGeoCache {
    fn get(&self, key: &str) -> Option<Arc<GeoRecord>> {
        let entry = self.entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.record.clone())
    }

    fn set(&self, key: String, record: Arc<GeoRecord>) {
        let entry = CacheEntry {
            record,
            expires_at: self.deadline(Instant::now()),
        };
        self.entries.insert(key, entry);
    }
}
