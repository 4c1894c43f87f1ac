//! Caching layer for offer responses.
//!
//! The planner asks for the same route and date whenever two search states
//! sit at the same airport on the same day. Caching the raw offers by
//! request avoids paying for those repeats.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::duffel::{DuffelError, Offer, OfferRequest};
use crate::planner::OfferProvider;

/// Cached offer list.
type OfferEntry = Arc<Vec<Offer>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
        }
    }
}

/// Offer provider with caching.
///
/// Wraps any [`OfferProvider`] and caches successful responses keyed by
/// (origin, destination, date). Errors are never cached.
pub struct CachedOfferClient<O> {
    inner: O,
    offers: MokaCache<OfferRequest, OfferEntry>,
}

impl<O: OfferProvider> CachedOfferClient<O> {
    /// Create a new cached client.
    pub fn new(inner: O, config: &CacheConfig) -> Self {
        let offers = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, offers }
    }

    /// Get offers, using the cache if available.
    pub async fn get_offers(&self, request: &OfferRequest) -> Result<OfferEntry, DuffelError> {
        if let Some(cached) = self.offers.get(request).await {
            trace!(
                origin = %request.origin,
                destination = %request.destination,
                "Offer cache hit"
            );
            return Ok(cached);
        }

        let entry = Arc::new(self.inner.search_offers(request).await?);
        self.offers.insert(*request, entry.clone()).await;

        Ok(entry)
    }

    /// Access the underlying provider.
    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.offers.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.offers.invalidate_all();
    }
}

impl<O: OfferProvider> OfferProvider for CachedOfferClient<O> {
    async fn search_offers(&self, request: &OfferRequest) -> Result<Vec<Offer>, DuffelError> {
        let entry = self.get_offers(request).await?;
        Ok(entry.as_ref().clone())
    }
}
