//! The seam to remote JSON APIs.
//!
//! Services that resolve identifiers through a third party (What3Words,
//! Bannergress) take an injected [`JsonFetcher`]. This crate never opens a
//! connection itself; the embedding application provides the transport.

use crate::error::FetchError;
use betterlocation_core::cache::{Cache, CacheConfig};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fetches a URL and returns its JSON body.
pub trait JsonFetcher: Send + Sync {
    /// # Errors
    /// Any [`FetchError`]; callers turn it into a per-match failure.
    fn get(&self, url: &str) -> Result<Value, FetchError>;
}

impl<F: JsonFetcher + ?Sized> JsonFetcher for Arc<F> {
    fn get(&self, url: &str) -> Result<Value, FetchError> {
        (**self).get(url)
    }
}

/// Fetcher used when no transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledFetcher;

impl JsonFetcher for DisabledFetcher {
    fn get(&self, _url: &str) -> Result<Value, FetchError> {
        Err(FetchError::Unavailable)
    }
}

/// Wraps a fetcher with the in-memory TTL cache.
///
/// Only successful responses are cached. A cache failure falls through to
/// the inner fetcher.
pub struct CachedFetcher<F> {
    inner: F,
    cache: Cache,
}

impl<F: JsonFetcher> CachedFetcher<F> {
    pub fn new(inner: F, config: CacheConfig) -> Self {
        Self {
            inner,
            cache: Cache::new(config),
        }
    }

    /// The underlying cache, for statistics and cleanup.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}

impl<F: JsonFetcher> JsonFetcher for CachedFetcher<F> {
    fn get(&self, url: &str) -> Result<Value, FetchError> {
        match self.cache.get::<Value>(url) {
            Ok(Some(value)) => {
                tracing::trace!("Fetch cache hit");
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "Fetch cache unreadable"),
        }

        let value = self.inner.get(url)?;
        if let Err(e) = self.cache.set(url, &value, None) {
            tracing::debug!(error = %e, "Fetch cache not updated");
        }
        Ok(value)
    }
}

impl<F> fmt::Debug for CachedFetcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFetcher")
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

/// Canned responses keyed by exact URL.
///
/// Unknown URLs answer with status 404. Used by tests and benchmarks.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Result<Value, FetchError>>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_response(mut self, url: impl Into<String>, body: Value) -> Self {
        self.responses.insert(url.into(), Ok(body));
        self
    }

    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.responses.insert(url.into(), Err(error));
        self
    }

    /// Number of requests served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl JsonFetcher for MemoryFetcher {
    fn get(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.responses.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_fetcher() {
        let fetcher = MemoryFetcher::new()
            .with_response("https://example.test/a", json!({"ok": true}))
            .with_failure("https://example.test/b", FetchError::Unavailable);

        assert_eq!(fetcher.get("https://example.test/a").unwrap()["ok"], true);
        assert_eq!(fetcher.get("https://example.test/b"), Err(FetchError::Unavailable));
        assert!(matches!(
            fetcher.get("https://example.test/c"),
            Err(FetchError::Status { status: 404, .. })
        ));
        assert_eq!(fetcher.calls(), 3);
    }

    #[test]
    fn test_cached_fetcher_hits_inner_once() {
        let inner = Arc::new(MemoryFetcher::new().with_response("u", json!([1, 2])));
        let cached = CachedFetcher::new(Arc::clone(&inner), CacheConfig::default());

        assert_eq!(cached.get("u").unwrap(), json!([1, 2]));
        assert_eq!(cached.get("u").unwrap(), json!([1, 2]));
        assert_eq!(inner.calls(), 1);
        assert_eq!(cached.cache().stats().total_entries, 1);
    }

    #[test]
    fn test_cached_fetcher_does_not_cache_failures() {
        let inner = Arc::new(MemoryFetcher::new());
        let cached = CachedFetcher::new(Arc::clone(&inner), CacheConfig::default());

        assert!(cached.get("missing").is_err());
        assert!(cached.get("missing").is_err());
        assert_eq!(inner.calls(), 2);
    }

    #[test]
    fn test_disabled_fetcher() {
        assert_eq!(DisabledFetcher.get("anything"), Err(FetchError::Unavailable));
    }
}
