//! Airport code to coordinates, memoized per search run.

use std::sync::atomic::{AtomicUsize, Ordering};

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{Coordinates, IataCode};
use crate::duffel::{Place, PlaceQuery};
use crate::planner::PlaceProvider;
use crate::retry::RetryPolicy;

use super::error::PlaceError;

/// Upper bound on memoized airports. A single search touches far fewer.
const MAX_CACHED_AIRPORTS: u64 = 10_000;

/// Resolves airport coordinates through the places service.
///
/// Results are cached by code for the lifetime of the resolver, which the
/// planner creates once per search. Caller-owned states are never mutated.
pub struct PlaceResolver<'a, P> {
    places: &'a P,
    retry: &'a RetryPolicy,
    cache: MokaCache<IataCode, Coordinates>,
    lookups: AtomicUsize,
}

impl<'a, P: PlaceProvider> PlaceResolver<'a, P> {
    pub fn new(places: &'a P, retry: &'a RetryPolicy) -> Self {
        Self {
            places,
            retry,
            cache: MokaCache::builder()
                .max_capacity(MAX_CACHED_AIRPORTS)
                .build(),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Coordinates of an airport.
    ///
    /// Queries the places service by name. The first airport entry in the
    /// response is authoritative, even if its code differs; if it carries
    /// no coordinates the airport is `NotFound`.
    pub async fn resolve(&self, code: IataCode) -> Result<Coordinates, PlaceError> {
        if let Some(coords) = self.cache.get(&code).await {
            return Ok(coords);
        }

        let places = self
            .search(&PlaceQuery::Name(code.to_string()))
            .await?;

        let coords = places
            .iter()
            .find(|p| p.is_airport())
            .and_then(Place::coordinates)
            .ok_or(PlaceError::NotFound(code))?;

        debug!(
            airport = %code,
            lat = coords.latitude,
            lon = coords.longitude,
            "Resolved airport"
        );

        // A concurrent lookup may have won the race; keep its answer.
        Ok(self.cache.entry(code).or_insert(coords).await.into_value())
    }

    /// Seed the cache with coordinates learned elsewhere.
    ///
    /// Coordinates already known for `code` are kept.
    pub async fn remember(&self, code: IataCode, coords: Coordinates) {
        self.cache.entry(code).or_insert(coords).await;
    }

    /// Cached coordinates, without going upstream.
    pub async fn cached(&self, code: IataCode) -> Option<Coordinates> {
        self.cache.get(&code).await
    }

    /// Run a places query with retries, counting it as an upstream lookup.
    pub async fn search(&self, query: &PlaceQuery) -> Result<Vec<Place>, PlaceError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let places = self
            .retry
            .run("places", || self.places.list_places(query))
            .await?;
        Ok(places)
    }

    /// Number of upstream place queries made so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}
