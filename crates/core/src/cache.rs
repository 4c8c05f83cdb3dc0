//! In-memory TTL cache for remote lookups
//!
//! Values are stored as serialized JSON so one cache can hold responses
//! of any shape. Entries expire after their TTL and the cache never grows
//! past `max_entries`: expired entries go first, then the entry closest
//! to expiry.
//!
//! # Example
//!
//! ```rust
//! use betterlocation_core::cache::{Cache, CacheConfig};
//!
//! let cache = Cache::new(CacheConfig::default());
//! cache.set("key", &"value", None).unwrap();
//! assert_eq!(cache.get::<String>("key").unwrap(), Some("value".to_string()));
//! ```

use crate::config::CacheSettings;
use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default TTL in seconds (0 = no expiry)
    pub default_ttl_secs: u64,
    /// Maximum number of entries (at least 1)
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 3600,
            max_entries: 1024,
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            default_ttl_secs: settings.ttl_secs,
            max_entries: settings.max_entries.max(1),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    expires_at: Option<Instant>,
    data: Vec<u8>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Thread-safe in-memory cache
#[derive(Debug)]
pub struct Cache {
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl Cache {
    /// Create a new cache instance
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get a cached value, `None` when missing or expired
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let guard = self
            .entries
            .read()
            .map_err(|_| Error::cache("Failed to acquire cache read lock"))?;

        match guard.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => {
                Ok(Some(serde_json::from_slice(&entry.data)?))
            }
            _ => Ok(None),
        }
    }

    /// Set a cached value; `ttl` overrides the configured default
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let data = serde_json::to_vec(value)?;
        let ttl = ttl.unwrap_or(Duration::from_secs(self.config.default_ttl_secs));
        let now = Instant::now();
        let entry = CacheEntry {
            expires_at: (!ttl.is_zero()).then(|| now + ttl),
            data,
        };

        let mut guard = self
            .entries
            .write()
            .map_err(|_| Error::cache("Failed to acquire cache write lock"))?;

        if !guard.contains_key(key) && guard.len() >= self.config.max_entries {
            evict_one(&mut guard, now);
        }
        guard.insert(key.to_string(), entry);
        Ok(())
    }

    /// Remove a cached value
    pub fn remove(&self, key: &str) -> bool {
        self.entries
            .write()
            .map(|mut guard| guard.remove(key).is_some())
            .unwrap_or(false)
    }

    /// Clear all cached values
    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.write() {
            guard.clear();
        }
    }

    /// Clean up expired entries
    pub fn cleanup(&self) -> usize {
        let Ok(mut guard) = self.entries.write() else {
            return 0;
        };
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, entry| !entry.is_expired(now));
        before - guard.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        self.entries
            .read()
            .map(|guard| CacheStats {
                total_entries: guard.len(),
                expired_entries: guard.values().filter(|e| e.is_expired(now)).count(),
                total_size_bytes: guard.values().map(|e| e.data.len()).sum(),
            })
            .unwrap_or_default()
    }
}

fn evict_one(entries: &mut HashMap<String, CacheEntry>, now: Instant) {
    let expired = entries
        .iter()
        .find(|(_, entry)| entry.is_expired(now))
        .map(|(key, _)| key.clone());

    // entries without expiry sort last
    let victim = expired.or_else(|| {
        entries
            .iter()
            .min_by_key(|(_, entry)| (entry.expires_at.is_none(), entry.expires_at))
            .map(|(key, _)| key.clone())
    });

    if let Some(key) = victim {
        entries.remove(&key);
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CacheStats {
    /// Total number of cache entries
    pub total_entries: usize,
    /// Number of expired entries still held
    pub expired_entries: usize,
    /// Total size of cached data in bytes
    pub total_size_bytes: usize,
}

/// Return the cached value for `key` or compute, store and return it
pub fn cached<F, T>(cache: &Cache, key: &str, ttl: Option<Duration>, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
    T: Serialize + DeserializeOwned,
{
    if let Some(value) = cache.get::<T>(key)? {
        return Ok(value);
    }

    let value = f()?;
    cache.set(key, &value, ttl)?;
    Ok(value)
}
