//! Itinerary planner using best-first search.
//!
//! This module implements the core planning algorithm that answers:
//! "How do I get from this airport to that one within my budget, stop
//! limit and trip length?"
//!
//! The search treats airports as states and priced flight offers as edges.
//! It discovers intermediate airports on the fly rather than working from a
//! fixed route map.

mod config;
mod evaluate;
mod frontier;
mod search;
mod transition;

pub use config::SearchConfig;
pub use evaluate::{Evaluator, EvaluatorWeights};
pub use frontier::{Entry, Frontier, VisitedKey, VisitedSet};
pub use search::{
    OfferProvider, PlaceProvider, Planner, SearchError, SearchPhase, SearchRequest, SearchResult,
};
pub use transition::{Rejection, StateTransition};
