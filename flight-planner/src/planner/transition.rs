//! Applying a travel action to a search state.

use chrono::{Duration, NaiveDateTime};

use crate::domain::{LocationState, TravelAction};

use super::search::SearchRequest;

/// Why a successor state was pruned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("cost {cost:.2} exceeds budget {budget:.2}")]
    BudgetExceeded { cost: f64, budget: f64 },

    #[error("{stops} stops exceeds maximum {max}")]
    StopsExceeded { stops: u32, max: u32 },

    /// The flight leaves before the traveller is ready to
    #[error("departure {departing_at} is before {earliest}")]
    StayTooShort {
        departing_at: NaiveDateTime,
        earliest: NaiveDateTime,
    },

    #[error("trip would need {needed} days, only {days_left} left")]
    TripExpired { needed: i64, days_left: u32 },
}

/// The constraint set a successor state must satisfy.
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub budget: f64,
    pub max_stops: u32,
    /// Required time on the ground at every airport except the origin.
    pub min_stay: Duration,
}

impl StateTransition {
    pub fn new(budget: f64, max_stops: u32, min_stay: Duration) -> Self {
        Self {
            budget,
            max_stops,
            min_stay,
        }
    }

    pub fn from_request(request: &SearchRequest) -> Self {
        Self::new(request.budget, request.max_stops, request.min_stay)
    }

    /// Time the traveller must spend at `state` before flying on.
    pub fn required_stay(&self, state: &LocationState) -> Duration {
        if state.is_origin() {
            Duration::zero()
        } else {
            self.min_stay
        }
    }

    /// Earliest moment a flight may leave `state`'s airport.
    pub fn earliest_departure(&self, state: &LocationState) -> NaiveDateTime {
        state
            .datetime
            .checked_add_signed(self.required_stay(state))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// The state reached by taking `action` from `state`.
    ///
    /// Checks run in a fixed order: budget, stops, stay, trip days. The
    /// successor's coordinates are left for the caller to fill in.
    pub fn apply(
        &self,
        state: &LocationState,
        action: &TravelAction,
    ) -> Result<LocationState, Rejection> {
        let cost = state.cost + action.cost;
        if cost > self.budget {
            return Err(Rejection::BudgetExceeded {
                cost,
                budget: self.budget,
            });
        }

        let stops = state
            .stops
            .saturating_add(1)
            .saturating_add(action.stops);
        if stops > self.max_stops {
            return Err(Rejection::StopsExceeded {
                stops,
                max: self.max_stops,
            });
        }

        let earliest = self.earliest_departure(state);
        if action.departing_at < earliest {
            return Err(Rejection::StayTooShort {
                departing_at: action.departing_at,
                earliest,
            });
        }

        // Local times in different zones can make this negative.
        let needed = (action.arriving_at - state.datetime).num_days().max(0);
        if needed > i64::from(state.days_left) {
            return Err(Rejection::TripExpired {
                needed,
                days_left: state.days_left,
            });
        }

        let city = action
            .destination_city
            .clone()
            .unwrap_or_else(|| action.destination.to_string());

        Ok(LocationState {
            airport: action.destination,
            city,
            datetime: action.arriving_at,
            days_left: state.days_left - needed as u32,
            stops,
            cost,
            coordinates: None,
        })
    }
}
