//! Mock Duffel client for testing without API access.
//!
//! Serves canned offers and places, either built in code or loaded from a
//! directory of JSON files shaped like live API responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::IataCode;
use crate::planner::{OfferProvider, PlaceProvider};

use super::error::DuffelError;
use super::types::{DataEnvelope, Offer, OfferRequest, OfferRequestData, Place, PlaceQuery};

/// The places service never returns more than this many suggestions.
const MAX_SUGGESTIONS: usize = 20;

type Route = (IataCode, IataCode);

/// Mock Duffel client.
///
/// Offers are keyed by origin and destination; the requested departure date
/// is ignored, mock data is static.
#[derive(Debug, Default)]
pub struct MockDuffelClient {
    offers: HashMap<Route, Vec<Offer>>,
    places: Vec<Place>,
    /// Remaining transient failures to inject per route.
    failures: Mutex<HashMap<Route, usize>>,
    latency: Option<Duration>,
    offer_calls: Arc<AtomicUsize>,
    place_calls: Arc<AtomicUsize>,
}

impl MockDuffelClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load fixtures from a directory.
    ///
    /// Expects `places.json` (a `GET /places/suggestions` response) and any
    /// number of `{ORIGIN}-{DESTINATION}.json` files holding offer request
    /// responses, e.g. `SNA-EWR.json`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, DuffelError> {
        let dir = dir.as_ref();
        let mut mock = Self::new();

        let entries = std::fs::read_dir(dir).map_err(|e| {
            DuffelError::Fixture(format!("Failed to read mock data directory {dir:?}: {e}"))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                DuffelError::Fixture(format!("Failed to read directory entry: {e}"))
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| DuffelError::Fixture(format!("Invalid filename: {path:?}")))?;

            let json = std::fs::read_to_string(&path)
                .map_err(|e| DuffelError::Fixture(format!("Failed to read {path:?}: {e}")))?;

            if stem == "places" {
                let places: DataEnvelope<Vec<Place>> = serde_json::from_str(&json)
                    .map_err(|e| DuffelError::Fixture(format!("Failed to parse {path:?}: {e}")))?;
                mock.places.extend(places.data);
                continue;
            }

            let (origin, destination) = parse_route(stem)
                .ok_or_else(|| DuffelError::Fixture(format!("Invalid route in filename: {stem}")))?;

            let response: DataEnvelope<OfferRequestData> = serde_json::from_str(&json)
                .map_err(|e| DuffelError::Fixture(format!("Failed to parse {path:?}: {e}")))?;

            mock = mock.with_offers(origin, destination, response.data.offers);
        }

        if mock.places.is_empty() && mock.offers.is_empty() {
            return Err(DuffelError::Fixture(format!(
                "No mock fixture files found in {dir:?}"
            )));
        }

        Ok(mock)
    }

    pub fn with_offer(self, origin: IataCode, destination: IataCode, offer: Offer) -> Self {
        self.with_offers(origin, destination, vec![offer])
    }

    pub fn with_offers(
        mut self,
        origin: IataCode,
        destination: IataCode,
        offers: Vec<Offer>,
    ) -> Self {
        self.offers
            .entry((origin, destination))
            .or_default()
            .extend(offers);
        self
    }

    pub fn with_place(mut self, place: Place) -> Self {
        self.places.push(place);
        self
    }

    /// Fail the next `count` offer requests for a route with a rate limit.
    pub fn with_failures(mut self, origin: IataCode, destination: IataCode, count: usize) -> Self {
        self.failures
            .get_mut()
            .insert((origin, destination), count);
        self
    }

    /// Delay every response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of offer requests received, including failed ones.
    pub fn offer_calls(&self) -> usize {
        self.offer_calls.load(Ordering::Relaxed)
    }

    /// Number of place queries received.
    pub fn place_calls(&self) -> usize {
        self.place_calls.load(Ordering::Relaxed)
    }

    pub async fn search_offers(&self, request: &OfferRequest) -> Result<Vec<Offer>, DuffelError> {
        self.offer_calls.fetch_add(1, Ordering::Relaxed);
        self.delay().await;

        let route = (request.origin, request.destination);
        {
            let mut failures = self.failures.lock().await;
            if let Some(remaining) = failures.get_mut(&route).filter(|n| **n > 0) {
                *remaining -= 1;
                return Err(DuffelError::RateLimited);
            }
        }

        Ok(self.offers.get(&route).cloned().unwrap_or_default())
    }

    pub async fn list_places(&self, query: &PlaceQuery) -> Result<Vec<Place>, DuffelError> {
        self.place_calls.fetch_add(1, Ordering::Relaxed);
        self.delay().await;

        let matches = self
            .places
            .iter()
            .filter(|place| matches_query(place, query))
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect();

        Ok(matches)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn parse_route(stem: &str) -> Option<Route> {
    let (origin, destination) = stem.split_once('-')?;
    Some((
        IataCode::parse_lenient(origin).ok()?,
        IataCode::parse_lenient(destination).ok()?,
    ))
}

fn matches_query(place: &Place, query: &PlaceQuery) -> bool {
    match query {
        PlaceQuery::Name(name) => {
            let name = name.trim();
            place
                .iata_code
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(name))
                || contains_ignore_case(place.name.as_deref(), name)
        }
        PlaceQuery::Query(text) => {
            let text = text.trim();
            place
                .iata_code
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(text))
                || contains_ignore_case(place.name.as_deref(), text)
                || contains_ignore_case(place.city_name.as_deref(), text)
        }
        PlaceQuery::Radius { center, radius_m } => place
            .coordinates()
            .is_some_and(|c| c.distance_km(center) * 1000.0 <= *radius_m as f64),
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    !needle.is_empty()
        && haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

impl OfferProvider for MockDuffelClient {
    async fn search_offers(&self, request: &OfferRequest) -> Result<Vec<Offer>, DuffelError> {
        MockDuffelClient::search_offers(self, request).await
    }
}

impl PlaceProvider for MockDuffelClient {
    async fn list_places(&self, query: &PlaceQuery) -> Result<Vec<Place>, DuffelError> {
        MockDuffelClient::list_places(self, query).await
    }
}
