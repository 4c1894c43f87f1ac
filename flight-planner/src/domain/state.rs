//! Search nodes.

use std::fmt;

use chrono::NaiveDateTime;

use super::{Coordinates, IataCode};

/// Where the traveller is, when they got there, and what they have spent.
///
/// States are immutable once built. Coordinates are attached at creation
/// when already known; otherwise the planner resolves them through its
/// resolver cache rather than mutating the state.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationState {
    pub airport: IataCode,
    pub city: String,
    /// Arrival time at `airport` (departure time for the origin).
    pub datetime: NaiveDateTime,
    pub days_left: u32,
    /// Legs taken plus every internal stop on those legs.
    pub stops: u32,
    pub cost: f64,
    pub coordinates: Option<Coordinates>,
}

impl LocationState {
    /// The state a search starts from: nothing spent, no stops taken.
    pub fn origin(
        airport: IataCode,
        city: impl Into<String>,
        datetime: NaiveDateTime,
        days_left: u32,
    ) -> Self {
        Self {
            airport,
            city: city.into(),
            datetime,
            days_left,
            stops: 0,
            cost: 0.0,
            coordinates: None,
        }
    }

    /// Attach already-known coordinates.
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// True for the state a search starts from.
    pub fn is_origin(&self) -> bool {
        self.stops == 0
    }
}

impl fmt::Display for LocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Airport: {}, {} at {}",
            self.airport,
            self.city,
            self.datetime.format("%Y-%m-%d %H:%M")
        )
    }
}
