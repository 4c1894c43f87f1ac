//! Duffel API request and response DTOs.
//!
//! These types map directly to the Duffel JSON API. They use `Option`
//! liberally because Duffel sends `null` for fields it does not know
//! (segment distance and duration, aircraft, city names).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinates, IataCode};

/// Every Duffel response wraps its payload in a `data` member.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Body of `POST /air/offer_requests`.
#[derive(Debug, Clone, Serialize)]
pub struct OfferRequestBody {
    pub slices: Vec<SliceRequest>,
    pub passengers: Vec<PassengerRequest>,
    pub cabin_class: &'static str,
}

/// One requested origin → destination leg.
#[derive(Debug, Clone, Serialize)]
pub struct SliceRequest {
    pub origin: String,
    pub destination: String,
    /// `YYYY-MM-DD`.
    pub departure_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassengerRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Payload of the offer request response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OfferRequestData {
    #[serde(default)]
    pub offers: Vec<Offer>,
}

/// A priced itinerary proposal.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Offer {
    pub id: String,

    /// Decimal string, e.g. `"450.00"`.
    pub total_amount: String,

    pub total_currency: Option<String>,

    #[serde(default)]
    pub slices: Vec<OfferSlice>,
}

/// One directional portion of an offer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OfferSlice {
    pub origin: Option<PlaceRef>,
    pub destination: Option<PlaceRef>,
    pub duration: Option<String>,
    #[serde(default)]
    pub segments: Vec<OfferSegment>,
}

/// One physical flight within a slice.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OfferSegment {
    pub origin: PlaceRef,
    pub destination: PlaceRef,

    /// Local time at the origin, ISO 8601 without offset.
    pub departing_at: String,

    /// Local time at the destination, ISO 8601 without offset.
    pub arriving_at: String,

    /// ISO 8601 duration, e.g. `"PT5H30M"`.
    pub duration: Option<String>,

    /// Kilometres as a decimal string.
    pub distance: Option<String>,

    pub operating_carrier: Carrier,
    pub marketing_carrier: Option<Carrier>,
    pub operating_carrier_flight_number: Option<String>,
    pub marketing_carrier_flight_number: Option<String>,
    pub aircraft: Option<Aircraft>,

    /// Touchdowns without a change of aircraft.
    #[serde(default)]
    pub stops: Vec<SegmentStop>,
}

/// Airport or city reference embedded in offers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaceRef {
    pub iata_code: String,
    pub name: Option<String>,
    pub city_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Carrier {
    pub name: String,
    pub iata_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Aircraft {
    pub name: Option<String>,
    pub iata_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SegmentStop {
    pub id: Option<String>,
    pub duration: Option<String>,
    pub departing_at: Option<String>,
    pub arriving_at: Option<String>,
    pub airport: PlaceRef,
}

/// An entry from `GET /places/suggestions`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Place {
    /// `"airport"` or `"city"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub iata_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub name: Option<String>,
    pub city_name: Option<String>,
}

impl Place {
    pub fn is_airport(&self) -> bool {
        self.kind == "airport"
    }

    /// The place's code, if it has a well-formed one.
    pub fn code(&self) -> Option<IataCode> {
        self.iata_code
            .as_deref()
            .and_then(|c| IataCode::parse_lenient(c).ok())
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

/// A single-slice, one-adult, economy offer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OfferRequest {
    pub origin: IataCode,
    pub destination: IataCode,
    pub departure_date: NaiveDate,
}

impl OfferRequest {
    pub fn new(origin: IataCode, destination: IataCode, departure_date: NaiveDate) -> Self {
        Self {
            origin,
            destination,
            departure_date,
        }
    }

    /// Wire body for this request.
    pub fn to_body(&self) -> OfferRequestBody {
        OfferRequestBody {
            slices: vec![SliceRequest {
                origin: self.origin.to_string(),
                destination: self.destination.to_string(),
                departure_date: self.departure_date.format("%Y-%m-%d").to_string(),
            }],
            passengers: vec![PassengerRequest { kind: "adult" }],
            cabin_class: "economy",
        }
    }
}

/// The ways the places service can be searched.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceQuery {
    /// Free-text search.
    Query(String),
    /// Search by name or code.
    Name(String),
    /// Places within `radius_m` metres of `center`.
    Radius { center: Coordinates, radius_m: u64 },
}

impl PlaceQuery {
    /// Query-string parameters for `GET /places/suggestions`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        match self {
            PlaceQuery::Query(q) => vec![("query", q.clone())],
            PlaceQuery::Name(n) => vec![("name", n.clone())],
            PlaceQuery::Radius { center, radius_m } => vec![
                ("rad", radius_m.to_string()),
                ("lat", center.latitude.to_string()),
                ("lng", center.longitude.to_string()),
            ],
        }
    }
}
