//! Best-first itinerary search.
//!
//! Starting from the origin, the planner repeatedly pops the lowest-scored
//! state, discovers candidate airports around it, fetches and normalizes
//! offers to each candidate, and queues every successor the constraints
//! admit. The search stops when the goal is popped, the frontier runs dry,
//! or the deadline or expansion cap is hit.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, NaiveDateTime};
use futures::future::join_all;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, trace, warn};

use crate::domain::{IataCode, Itinerary, LocationState, TravelAction};
use crate::duffel::{DuffelError, Offer, OfferRequest, Place, PlaceQuery, normalize_offers};
use crate::places::{NeighborDiscovery, PlaceResolver};

use super::config::SearchConfig;
use super::evaluate::Evaluator;
use super::frontier::{Frontier, VisitedSet};
use super::transition::StateTransition;

/// Source of flight offers.
///
/// This abstraction allows the planner to be tested with mock data.
#[allow(async_fn_in_trait)]
pub trait OfferProvider {
    /// Offers for a single-slice, one-adult, economy trip.
    async fn search_offers(&self, request: &OfferRequest) -> Result<Vec<Offer>, DuffelError>;
}

/// Source of airport locations.
#[allow(async_fn_in_trait)]
pub trait PlaceProvider {
    /// Places matching a query, at most 20.
    async fn list_places(&self, query: &PlaceQuery) -> Result<Vec<Place>, DuffelError>;
}

/// Error from itinerary search.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// Every reachable state was expanded without reaching the goal
    #[error("no route found after {expansions} expansions")]
    NoRouteFound { expansions: usize },

    /// The deadline or expansion cap was hit first
    #[error("search timed out after {expansions} expansions")]
    Timeout {
        expansions: usize,
        /// The expanded itinerary that got closest to the goal, if any.
        best_partial: Option<Itinerary>,
    },

    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}

impl SearchError {
    /// The phase the search ended in.
    pub fn phase(&self) -> SearchPhase {
        match self {
            SearchError::NoRouteFound { .. } => SearchPhase::Exhausted,
            SearchError::Timeout { .. } => SearchPhase::TimedOut,
            SearchError::InvalidRequest(_) => SearchPhase::Initialized,
        }
    }
}

/// Lifecycle of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Initialized,
    Expanding,
    Succeeded,
    Exhausted,
    TimedOut,
}

/// Request for itinerary search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub origin: IataCode,
    pub origin_city: String,
    pub goal: IataCode,
    pub goal_city: String,

    /// Earliest departure from the origin, local time.
    pub departure: NaiveDateTime,

    /// Days available for the whole trip.
    pub trip_days: u32,

    /// Maximum total cost, in the offers' currency.
    pub budget: f64,

    /// Maximum legs plus internal stops.
    pub max_stops: u32,

    /// Required time on the ground at each intermediate airport.
    pub min_stay: Duration,
}

impl SearchRequest {
    /// Create a new search request with default constraints.
    pub fn new(origin: IataCode, goal: IataCode, departure: NaiveDateTime) -> Self {
        Self {
            origin,
            origin_city: origin.to_string(),
            goal,
            goal_city: goal.to_string(),
            departure,
            trip_days: 10,
            budget: 1000.0,
            max_stops: 2,
            min_stay: Duration::zero(),
        }
    }

    pub fn with_cities(mut self, origin_city: impl Into<String>, goal_city: impl Into<String>) -> Self {
        self.origin_city = origin_city.into();
        self.goal_city = goal_city.into();
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_max_stops(mut self, max_stops: u32) -> Self {
        self.max_stops = max_stops;
        self
    }

    pub fn with_trip_days(mut self, days: u32) -> Self {
        self.trip_days = days;
        self
    }

    pub fn with_min_stay(mut self, min_stay: Duration) -> Self {
        self.min_stay = min_stay;
        self
    }

    /// Validate the search request.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.origin == self.goal {
            return Err(SearchError::InvalidRequest(format!(
                "origin and goal are both {}",
                self.origin
            )));
        }

        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(SearchError::InvalidRequest(format!(
                "budget must be a non-negative amount, got {}",
                self.budget
            )));
        }

        if self.min_stay < Duration::zero() {
            return Err(SearchError::InvalidRequest(
                "minimum stay cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Result of a successful itinerary search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub itinerary: Itinerary,

    /// The state reached at the goal.
    pub arrival: LocationState,

    /// Number of states expanded.
    pub expansions: usize,

    /// Offer requests sent upstream, retries included.
    pub offer_requests: usize,

    /// Place queries sent upstream.
    pub place_lookups: usize,
}

impl SearchResult {
    pub fn phase(&self) -> SearchPhase {
        SearchPhase::Succeeded
    }
}

/// A search state plus how it was reached.
#[derive(Debug)]
struct Node {
    state: LocationState,
    parent: Option<(usize, TravelAction)>,
}

/// The expanded non-origin node closest to the goal.
#[derive(Debug, Clone, Copy)]
struct BestPartial {
    node: usize,
    remaining_km: f64,
    cost: f64,
}

/// Everything one expansion needs, shared read-only.
struct Expansion<'r, 'a, O, P> {
    offers: &'a O,
    resolver: &'r PlaceResolver<'a, P>,
    discovery: NeighborDiscovery<'r, 'a, P>,
    transition: &'r StateTransition,
    config: &'a SearchConfig,
    goal: IataCode,
    offer_requests: AtomicUsize,
}

impl<O: OfferProvider, P: PlaceProvider> Expansion<'_, '_, O, P> {
    /// Admissible successors of `state`.
    ///
    /// Discovery failures abandon this state only. Offer failures (after
    /// retries) drop that one candidate edge.
    async fn successors(&self, state: &LocationState) -> Vec<(TravelAction, LocationState)> {
        let candidates = match self.discovery.candidates(state.airport, self.goal).await {
            Ok(c) => c,
            Err(e) => {
                warn!(airport = %state.airport, error = %e, "Discovery failed, skipping state");
                return Vec::new();
            }
        };

        let mut candidates: Vec<IataCode> = candidates.into_iter().collect();
        candidates.sort();

        let date = self.transition.earliest_departure(state).date();
        let mut successors = Vec::new();

        for batch in candidates.chunks(self.config.batch_size.max(1)) {
            let futures: Vec<_> = batch
                .iter()
                .map(|&destination| async move {
                    let request = OfferRequest::new(state.airport, destination, date);
                    let result = self
                        .config
                        .retry
                        .run("offers", || {
                            self.offer_requests.fetch_add(1, Ordering::Relaxed);
                            self.offers.search_offers(&request)
                        })
                        .await;
                    (destination, result)
                })
                .collect();

            let results = join_all(futures).await;

            for (destination, result) in results {
                let offers = match result {
                    Ok(offers) => offers,
                    Err(e) => {
                        debug!(
                            origin = %state.airport,
                            destination = %destination,
                            error = %e,
                            "Failed to fetch offers, dropping edge"
                        );
                        continue;
                    }
                };

                let coordinates = self.resolver.cached(destination).await;

                for action in normalize_offers(&offers, state.airport, destination) {
                    match self.transition.apply(state, &action) {
                        Ok(next) => {
                            let next = match coordinates {
                                Some(c) => next.with_coordinates(c),
                                None => next,
                            };
                            successors.push((action, next));
                        }
                        Err(rejection) => {
                            trace!(
                                offer = %action.offer_id,
                                origin = %state.airport,
                                destination = %destination,
                                %rejection,
                                "Pruned successor"
                            );
                        }
                    }
                }
            }
        }

        successors
    }
}

/// Itinerary planner.
pub struct Planner<'a, O, P> {
    offers: &'a O,
    places: &'a P,
    config: &'a SearchConfig,
}

impl<'a, O: OfferProvider, P: PlaceProvider> Planner<'a, O, P> {
    /// Create a new planner.
    pub fn new(offers: &'a O, places: &'a P, config: &'a SearchConfig) -> Self {
        Self {
            offers,
            places,
            config,
        }
    }

    /// Search for an itinerary from the request's origin to its goal.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        request.validate()?;

        let deadline = Instant::now() + self.config.deadline();
        let mut phase = SearchPhase::Initialized;

        let resolver = PlaceResolver::new(self.places, &self.config.retry);
        let transition = StateTransition::from_request(request);

        let Ok((origin_coords, goal_coords)) = timeout_at(
            deadline,
            futures::future::join(
                resolver.resolve(request.origin),
                resolver.resolve(request.goal),
            ),
        )
        .await
        else {
            debug!("Deadline hit while resolving endpoints");
            return Err(SearchError::Timeout {
                expansions: 0,
                best_partial: None,
            });
        };

        let goal_coords = match goal_coords {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(goal = %request.goal, error = %e, "Could not locate goal");
                None
            }
        };

        let mut origin = LocationState::origin(
            request.origin,
            request.origin_city.clone(),
            request.departure,
            request.trip_days,
        );
        if let Ok(c) = origin_coords {
            origin = origin.with_coordinates(c);
        }

        let evaluator = Evaluator::new(self.config.weights.clone(), request.departure, goal_coords);
        let expansion = Expansion {
            offers: self.offers,
            resolver: &resolver,
            discovery: NeighborDiscovery::new(&resolver, &self.config.discovery),
            transition: &transition,
            config: self.config,
            goal: request.goal,
            offer_requests: AtomicUsize::new(0),
        };

        let mut arena: Vec<Node> = Vec::new();
        let mut frontier = Frontier::new();
        let mut visited = VisitedSet::new();
        let mut best: Option<BestPartial> = None;
        let mut expansions = 0;

        visited.admit((origin.airport, origin.stops), origin.cost);
        frontier.push(0, evaluator.score(&origin), origin.cost);
        arena.push(Node {
            state: origin,
            parent: None,
        });

        let timed_out = |expansions: usize, best: Option<BestPartial>, arena: &[Node]| {
            SearchError::Timeout {
                expansions,
                best_partial: best.map(|b| reconstruct(arena, b.node)),
            }
        };

        while let Some(entry) = frontier.pop() {
            let state = &arena[entry.node].state;

            if visited.is_stale(&(state.airport, state.stops), state.cost) {
                continue;
            }

            if state.airport == request.goal {
                let itinerary = reconstruct(&arena, entry.node);
                debug!(
                    cost = state.cost,
                    stops = state.stops,
                    legs = itinerary.len(),
                    expansions,
                    "Reached goal"
                );
                return Ok(SearchResult {
                    itinerary,
                    arrival: state.clone(),
                    expansions,
                    offer_requests: expansion.offer_requests.load(Ordering::Relaxed),
                    place_lookups: resolver.lookups(),
                });
            }

            if !state.is_origin() {
                let remaining_km = evaluator.remaining_km(state);
                let closer = best.is_none_or(|b| {
                    remaining_km < b.remaining_km
                        || (remaining_km == b.remaining_km && state.cost < b.cost)
                });
                if closer {
                    best = Some(BestPartial {
                        node: entry.node,
                        remaining_km,
                        cost: state.cost,
                    });
                }
            }

            if expansions >= self.config.max_expansions {
                debug!(expansions, "Expansion cap reached");
                return Err(timed_out(expansions, best, &arena));
            }

            if phase == SearchPhase::Initialized {
                phase = SearchPhase::Expanding;
                trace!(?phase, "Search started");
            }
            expansions += 1;

            trace!(
                state = %state,
                cost = state.cost,
                stops = state.stops,
                score = entry.score,
                "Expanding"
            );

            let Ok(successors) = timeout_at(deadline, expansion.successors(state)).await else {
                debug!(expansions, "Deadline reached");
                return Err(timed_out(expansions, best, &arena));
            };

            let parent = entry.node;
            for (action, next) in successors {
                if !visited.admit((next.airport, next.stops), next.cost) {
                    continue;
                }
                let score = evaluator.score(&next);
                frontier.push(arena.len(), score, next.cost);
                arena.push(Node {
                    state: next,
                    parent: Some((parent, action)),
                });
            }
        }

        debug!(expansions, "Frontier exhausted");
        Err(SearchError::NoRouteFound { expansions })
    }
}

/// Walk parent links back from `node` to the origin.
fn reconstruct(arena: &[Node], mut node: usize) -> Itinerary {
    let mut actions = Vec::new();
    while let Some((parent, action)) = &arena[node].parent {
        actions.push(action.clone());
        node = *parent;
    }
    actions.reverse();
    Itinerary::new(actions)
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
