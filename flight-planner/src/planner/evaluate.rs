//! Frontier scoring.
//!
//! A state's score is a weighted sum of what it has cost so far, how long
//! the traveller has been on the road, and how far they still are from the
//! goal:
//!
//! ```text
//! score = cost_weight * cost
//!       + elapsed_weight * hours since departure
//!       + distance_weight * great-circle km to goal
//! ```
//!
//! The distance term only underestimates the remaining cost while
//! `distance_weight` stays below the cheapest fare per kilometre on offer,
//! so the search is best-effort rather than guaranteed cheapest.

use chrono::NaiveDateTime;

use crate::domain::{Coordinates, LocationState};

/// Weights of the score terms.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorWeights {
    /// Per unit of currency spent.
    pub cost: f64,
    /// Per hour elapsed since the search departure time.
    pub elapsed_hours: f64,
    /// Per kilometre left to the goal.
    pub remaining_km: f64,
}

impl Default for EvaluatorWeights {
    fn default() -> Self {
        Self {
            cost: 1.0,
            elapsed_hours: 1.0,
            remaining_km: 0.02,
        }
    }
}

/// Scores states for one search. Lower is better.
#[derive(Debug, Clone)]
pub struct Evaluator {
    weights: EvaluatorWeights,
    departure: NaiveDateTime,
    goal: Option<Coordinates>,
}

impl Evaluator {
    pub fn new(weights: EvaluatorWeights, departure: NaiveDateTime, goal: Option<Coordinates>) -> Self {
        Self {
            weights,
            departure,
            goal,
        }
    }

    /// Great-circle kilometres from the state to the goal, zero if either
    /// position is unknown.
    pub fn remaining_km(&self, state: &LocationState) -> f64 {
        match (state.coordinates, self.goal) {
            (Some(here), Some(goal)) => here.distance_km(&goal),
            _ => 0.0,
        }
    }

    pub fn score(&self, state: &LocationState) -> f64 {
        let elapsed_hours = ((state.datetime - self.departure).num_minutes() as f64 / 60.0).max(0.0);

        self.weights.cost * state.cost
            + self.weights.elapsed_hours * elapsed_hours
            + self.weights.remaining_km * self.remaining_km(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IataCode;
    use chrono::{Duration, NaiveDate};

    fn departure() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    }

    fn state(cost: f64, hours: i64, coords: Option<Coordinates>) -> LocationState {
        let mut s = LocationState::origin(
            IataCode::parse("ORD").unwrap(),
            "Chicago",
            departure() + Duration::hours(hours),
            10,
        );
        s.cost = cost;
        s.stops = 1;
        s.coordinates = coords;
        s
    }

    #[test]
    fn cost_and_time_terms() {
        let evaluator = Evaluator::new(EvaluatorWeights::default(), departure(), None);
        assert_eq!(evaluator.score(&state(300.0, 4, None)), 304.0);
    }

    #[test]
    fn unknown_coordinates_contribute_nothing() {
        let goal = Coordinates::new(40.6925, -74.1687);
        let evaluator = Evaluator::new(EvaluatorWeights::default(), departure(), Some(goal));
        assert_eq!(evaluator.remaining_km(&state(0.0, 0, None)), 0.0);
    }

    #[test]
    fn closer_states_score_lower() {
        let goal = Coordinates::new(40.6925, -74.1687);
        let evaluator = Evaluator::new(EvaluatorWeights::default(), departure(), Some(goal));

        let near = state(200.0, 3, Some(Coordinates::new(41.9786, -87.9048)));
        let far = state(200.0, 3, Some(Coordinates::new(33.6757, -117.8682)));

        assert!(evaluator.score(&near) < evaluator.score(&far));
        assert_eq!(evaluator.remaining_km(&state(0.0, 0, Some(goal))), 0.0);
    }

    #[test]
    fn custom_weights() {
        let weights = EvaluatorWeights {
            cost: 0.0,
            elapsed_hours: 2.0,
            remaining_km: 0.0,
        };
        let evaluator = Evaluator::new(weights, departure(), None);
        assert_eq!(evaluator.score(&state(999.0, 5, None)), 10.0);
    }

    #[test]
    fn clock_earlier_than_departure_counts_as_zero() {
        let evaluator = Evaluator::new(EvaluatorWeights::default(), departure(), None);
        assert_eq!(evaluator.score(&state(50.0, -3, None)), 50.0);
    }
}
