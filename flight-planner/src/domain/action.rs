//! Itinerary edges: travel actions and the flight segments they contain.

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::IataCode;
use super::error::DomainError;

/// How a travel action moves between locations.
///
/// Only flights are produced today; ground modes are reserved so that
/// itineraries can carry them once a ground-transport source exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelMode {
    Flight,
    Train,
    Rideshare,
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelMode::Flight => f.write_str("flight"),
            TravelMode::Train => f.write_str("train"),
            TravelMode::Rideshare => f.write_str("rideshare"),
        }
    }
}

/// An intermediate touchdown inside a single flight segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Layover {
    pub airport: IataCode,
    pub city: Option<String>,
    pub duration: Duration,
}

/// One physical flight.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSegment {
    pub origin: IataCode,
    pub destination: IataCode,
    pub departing_at: NaiveDateTime,
    pub arriving_at: NaiveDateTime,
    pub duration: Duration,
    /// Great-circle distance flown, 0.0 when the offer omits it.
    pub distance_km: f64,
    pub carrier: String,
    pub carrier_code: Option<String>,
    pub flight_number: String,
    pub aircraft: Option<String>,
    pub layovers: Vec<Layover>,
}

/// One complete offer mapped to a single state transition.
///
/// Totals are derived from the segments at construction time, so the
/// endpoints always agree with the first and last segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelAction {
    pub mode: TravelMode,
    pub offer_id: String,
    pub origin: IataCode,
    pub destination: IataCode,
    pub destination_city: Option<String>,
    pub departing_at: NaiveDateTime,
    pub arriving_at: NaiveDateTime,
    pub cost: f64,
    pub duration: Duration,
    /// Connections between segments plus every in-segment layover.
    pub stops: u32,
    pub segments: Vec<FlightSegment>,
}

impl TravelAction {
    /// Build a flight action from its ordered segments.
    pub fn flight(
        offer_id: impl Into<String>,
        cost: f64,
        segments: Vec<FlightSegment>,
    ) -> Result<Self, DomainError> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(DomainError::InvalidCost(cost));
        }

        let (first, last) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DomainError::EmptyAction),
        };

        let connections = (segments.len() - 1) as u32;
        let layovers: u32 = segments.iter().map(|s| s.layovers.len() as u32).sum();
        let duration = segments
            .iter()
            .try_fold(Duration::zero(), |acc, s| acc.checked_add(&s.duration))
            .ok_or(DomainError::DurationOverflow)?;

        Ok(Self {
            mode: TravelMode::Flight,
            offer_id: offer_id.into(),
            origin: first.origin,
            destination: last.destination,
            destination_city: None,
            departing_at: first.departing_at,
            arriving_at: last.arriving_at,
            cost,
            duration,
            stops: connections + layovers,
            segments,
        })
    }

    /// Attach the human-readable name of the destination city.
    pub fn with_destination_city(mut self, city: impl Into<String>) -> Self {
        self.destination_city = Some(city.into());
        self
    }

    /// Name of the carrier operating the first segment.
    pub fn carrier(&self) -> Option<&str> {
        self.segments.first().map(|s| s.carrier.as_str())
    }
}

impl fmt::Display for TravelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Travel by {} from {} to {} departing {} arriving {}",
            self.mode,
            self.origin,
            self.destination,
            self.departing_at.format("%Y-%m-%d %H:%M"),
            self.arriving_at.format("%Y-%m-%d %H:%M"),
        )?;
        if let Some(carrier) = self.carrier() {
            write!(f, " via {carrier}")?;
        }
        write!(f, " for ${:.2}", self.cost)
    }
}

/// A reconstructed start-to-goal sequence of actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    actions: Vec<TravelAction>,
}

impl Itinerary {
    pub fn new(actions: Vec<TravelAction>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[TravelAction] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn total_cost(&self) -> f64 {
        self.actions.iter().map(|a| a.cost).sum()
    }

    /// Legs plus every internal stop, matching the search's stop accounting.
    pub fn total_stops(&self) -> u32 {
        self.actions.iter().map(|a| 1 + a.stops).sum()
    }

    pub fn arrival(&self) -> Option<NaiveDateTime> {
        self.actions.last().map(|a| a.arriving_at)
    }

    /// Airports visited in order, starting with the origin.
    pub fn airports(&self) -> Vec<IataCode> {
        let mut out: Vec<IataCode> = self.actions.first().map(|a| a.origin).into_iter().collect();
        out.extend(self.actions.iter().map(|a| a.destination));
        out
    }
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            writeln!(f, "{action}")?;
        }
        write!(
            f,
            "Total: ${:.2}, {} stop(s)",
            self.total_cost(),
            self.total_stops()
        )
    }
}
