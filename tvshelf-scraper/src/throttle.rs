//! Shared gate for outbound catalog calls.
//!
//! The interval is measured from the end of the previous call, so a slow
//! request still leaves a full gap before the next one goes out.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tvshelf_catalog::types::{CatalogEpisode, CatalogSeason, ShowCandidate};

use crate::catalog::CatalogService;
use crate::error::CatalogError;

pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(200);

/// Enforces a minimum interval between the end of one call and the start of
/// the next.
///
/// Calls run while holding the lock, so concurrent callers queue up rather
/// than bursting or overlapping.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `call` once at least `interval` has passed since the previous
    /// call returned, then record when this one returned.
    pub fn run<T>(&self, call: impl FnOnce() -> T) -> T {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
        let result = call();
        *last = Some(Instant::now());
        result
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_INTERVAL)
    }
}

/// A [`CatalogService`] whose every call, image downloads included, passes
/// through a shared [`RateLimiter`].
pub struct ThrottledCatalog<C> {
    inner: C,
    limiter: Arc<RateLimiter>,
}

impl<C: CatalogService> ThrottledCatalog<C> {
    pub fn new(inner: C, limiter: Arc<RateLimiter>) -> Self {
        Self { inner, limiter }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

impl<C: CatalogService> CatalogService for ThrottledCatalog<C> {
    fn search_shows(&self, name: &str) -> Result<Vec<ShowCandidate>, CatalogError> {
        self.limiter.run(|| self.inner.search_shows(name))
    }

    fn list_seasons(&self, external_id: i64) -> Result<Vec<CatalogSeason>, CatalogError> {
        self.limiter.run(|| self.inner.list_seasons(external_id))
    }

    fn list_episodes(&self, season_id: i64) -> Result<Vec<CatalogEpisode>, CatalogError> {
        self.limiter.run(|| self.inner.list_episodes(season_id))
    }

    fn download_image(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        self.limiter.run(|| self.inner.download_image(url))
    }
}
