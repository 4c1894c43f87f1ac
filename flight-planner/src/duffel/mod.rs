//! Duffel flights API client.
//!
//! This module provides an HTTP client for the Duffel API, which the planner
//! uses for two things: flight offers between a pair of airports, and place
//! suggestions (airport coordinates and nearby airports).
//!
//! Key characteristics of Duffel:
//! - Every response wraps its payload in a `data` member
//! - Timestamps are local to the airport, without an offset
//! - Segment `duration` and `distance` may be `null`

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{DuffelClient, DuffelConfig};
pub use convert::{NormalizeError, normalize, normalize_offers, parse_timestamp};
pub use error::DuffelError;
pub use mock::MockDuffelClient;
pub use types::{
    Aircraft, Carrier, DataEnvelope, Offer, OfferRequest, OfferRequestBody, OfferRequestData,
    OfferSegment, OfferSlice, PassengerRequest, Place, PlaceQuery, PlaceRef, SegmentStop,
    SliceRequest,
};
