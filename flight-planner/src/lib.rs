//! Flight itinerary planner.
//!
//! Answers: "How do I fly from here to there within my budget, stop limit
//! and trip length?" by searching over airports, discovering intermediate
//! stops through the Duffel places API and pricing legs with Duffel offers.

pub mod cache;
pub mod domain;
pub mod duffel;
pub mod places;
pub mod planner;
pub mod retry;
