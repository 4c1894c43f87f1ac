//! Domain types for the flight itinerary planner.
//!
//! This module contains the core domain model: validated airport codes,
//! coordinates, search states and the travel actions that connect them.
//! Types enforce their invariants at construction time, so code that
//! receives them can trust their validity.

mod action;
mod airport;
mod coords;
mod duration;
mod error;
mod state;

pub use action::{FlightSegment, Itinerary, Layover, TravelAction, TravelMode};
pub use airport::{IataCode, InvalidIataCode};
pub use coords::{Coordinates, EARTH_RADIUS_KM, distance_km};
pub use duration::{DurationError, parse_iso8601, parse_optional_iso8601};
pub use error::DomainError;
pub use state::LocationState;
