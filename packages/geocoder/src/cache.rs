//! Injectable TTL cache for geocoding results.
//!
//! Caches both successful geocodes and misses, keyed by normalized
//! postcode, so repeated lookups of the same postcode never re-query a
//! provider within the TTL. Stale entries are evicted on read.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::GeocodedPostcode;

/// Default staleness bound for cached results. Postcode coordinates
/// essentially never move, but providers correct data, so entries are
/// not kept forever.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct CacheSlot {
    /// `None` is a cached miss.
    result: Option<GeocodedPostcode>,
    inserted_at: Instant,
}

/// An in-memory TTL cache for geocoding lookups.
///
/// The cache is an explicit component injected into the geocoding chain,
/// not ambient module state, so its staleness policy is visible at the
/// construction site and tests can swap it out.
pub struct GeocodeCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheSlot>>,
}

impl GeocodeCache {
    /// Creates a cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Looks up a normalized postcode.
    ///
    /// Returns `None` when there is no fresh entry; `Some(None)` for a
    /// cached miss; `Some(Some(result))` for a cached hit. Stale entries
    /// are removed as a side effect.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Option<GeocodedPostcode>> {
        let mut entries = self.entries.lock().expect("geocode cache mutex poisoned");
        match entries.get(key) {
            Some(slot) if slot.inserted_at.elapsed() < self.ttl => Some(slot.result.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Records a lookup result (hit or miss) for a normalized postcode.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    pub fn insert(&self, key: &str, result: Option<GeocodedPostcode>) {
        let mut entries = self.entries.lock().expect("geocode cache mutex poisoned");
        entries.insert(
            key.to_string(),
            CacheSlot {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of live entries (stale entries included until read).
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("geocode cache mutex poisoned")
            .len()
    }

    /// Returns `true` when the cache holds no entries.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GeocodeCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
