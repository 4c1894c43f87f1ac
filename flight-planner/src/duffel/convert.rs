//! Conversion from Duffel offers to travel actions.
//!
//! This module turns raw offer DTOs into validated [`TravelAction`]s:
//! parsing timestamps, ISO-8601 durations and nullable distances, and
//! checking that the offer actually runs between the requested airports.

use chrono::{DateTime, NaiveDateTime};
use tracing::debug;

use crate::domain::{
    DomainError, DurationError, FlightSegment, IataCode, Layover, TravelAction,
    parse_optional_iso8601,
};

use super::types::{Offer, OfferSegment, PlaceRef, SegmentStop};

/// Error during offer normalization. Each one disqualifies a single offer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    /// The offer does not run between the requested airports
    #[error(
        "offer {offer_id} runs {actual_origin}->{actual_destination}, expected {expected_origin}->{expected_destination}"
    )]
    Consistency {
        offer_id: String,
        expected_origin: IataCode,
        expected_destination: IataCode,
        actual_origin: IataCode,
        actual_destination: IataCode,
    },

    /// Single-slice requests must yield single-slice offers
    #[error("offer {offer_id} has {count} slices, expected exactly one")]
    SliceCount { offer_id: String, count: usize },

    /// The slice has no segments
    #[error("offer {0} has no segments")]
    NoSegments(String),

    /// Failed to parse an airport code
    #[error("invalid airport code: {0}")]
    InvalidCode(String),

    /// Failed to parse a timestamp
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Failed to parse the total amount
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Failed to parse a distance
    #[error("invalid distance: {0}")]
    InvalidDistance(String),

    #[error(transparent)]
    Duration(#[from] DurationError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Convert one offer into a travel action between the expected airports.
pub fn normalize(
    offer: &Offer,
    expected_origin: IataCode,
    expected_destination: IataCode,
) -> Result<TravelAction, NormalizeError> {
    let slice = match offer.slices.as_slice() {
        [slice] => slice,
        slices => {
            return Err(NormalizeError::SliceCount {
                offer_id: offer.id.clone(),
                count: slices.len(),
            });
        }
    };

    let segments = slice
        .segments
        .iter()
        .map(convert_segment)
        .collect::<Result<Vec<_>, _>>()?;

    let (actual_origin, actual_destination) = match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => (first.origin, last.destination),
        _ => return Err(NormalizeError::NoSegments(offer.id.clone())),
    };

    if actual_origin != expected_origin || actual_destination != expected_destination {
        return Err(NormalizeError::Consistency {
            offer_id: offer.id.clone(),
            expected_origin,
            expected_destination,
            actual_origin,
            actual_destination,
        });
    }

    let cost = parse_amount(&offer.total_amount)?;
    let action = TravelAction::flight(offer.id.clone(), cost, segments)?;

    let city = slice
        .segments
        .last()
        .and_then(|s| s.destination.city_name.clone());

    Ok(match city {
        Some(city) => action.with_destination_city(city),
        None => action,
    })
}

/// Convert every offer, logging and skipping the ones that fail.
///
/// Zero offers, or zero valid offers, simply means no edge exists for this
/// origin/destination pair.
pub fn normalize_offers(
    offers: &[Offer],
    expected_origin: IataCode,
    expected_destination: IataCode,
) -> Vec<TravelAction> {
    offers
        .iter()
        .filter_map(
            |offer| match normalize(offer, expected_origin, expected_destination) {
                Ok(action) => Some(action),
                Err(e) => {
                    debug!(offer = %offer.id, error = %e, "Skipping offer");
                    None
                }
            },
        )
        .collect()
}

fn convert_segment(segment: &OfferSegment) -> Result<FlightSegment, NormalizeError> {
    let flight_number = segment
        .operating_carrier_flight_number
        .clone()
        .or_else(|| segment.marketing_carrier_flight_number.clone())
        .unwrap_or_default();

    Ok(FlightSegment {
        origin: parse_code(&segment.origin)?,
        destination: parse_code(&segment.destination)?,
        departing_at: parse_timestamp(&segment.departing_at)?,
        arriving_at: parse_timestamp(&segment.arriving_at)?,
        duration: parse_optional_iso8601(segment.duration.as_deref())?,
        distance_km: parse_distance(segment.distance.as_deref())?,
        carrier: segment.operating_carrier.name.clone(),
        carrier_code: segment.operating_carrier.iata_code.clone(),
        flight_number,
        aircraft: segment.aircraft.as_ref().and_then(|a| a.name.clone()),
        layovers: segment
            .stops
            .iter()
            .map(convert_stop)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn convert_stop(stop: &SegmentStop) -> Result<Layover, NormalizeError> {
    Ok(Layover {
        airport: parse_code(&stop.airport)?,
        city: stop.airport.city_name.clone(),
        duration: parse_optional_iso8601(stop.duration.as_deref())?,
    })
}

fn parse_code(place: &PlaceRef) -> Result<IataCode, NormalizeError> {
    IataCode::parse_lenient(&place.iata_code)
        .map_err(|_| NormalizeError::InvalidCode(place.iata_code.clone()))
}

/// Parse a local timestamp such as `2024-05-01T08:00:00`.
///
/// Offsets, when present, are dropped in favour of the local wall-clock time
/// so that every timestamp in an itinerary is in its airport's local time.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, NormalizeError> {
    s.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.naive_local()))
        .map_err(|_| NormalizeError::InvalidTimestamp(s.to_string()))
}

fn parse_amount(s: &str) -> Result<f64, NormalizeError> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(NormalizeError::InvalidAmount(s.to_string())),
    }
}

/// Null distances count as zero kilometres.
fn parse_distance(s: Option<&str>) -> Result<f64, NormalizeError> {
    let Some(s) = s else {
        return Ok(0.0);
    };
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(NormalizeError::InvalidDistance(s.to_string())),
    }
}
