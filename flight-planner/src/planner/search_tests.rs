//! Unit tests for the best-first itinerary search.

use super::*;
use crate::cache::{CacheConfig, CachedOfferClient};
use crate::domain::Coordinates;
use crate::duffel::{Carrier, MockDuffelClient, OfferSegment, OfferSlice, PlaceRef};
use crate::places::DiscoveryConfig;
use crate::retry::RetryPolicy;
use chrono::NaiveDate;

fn code(s: &str) -> IataCode {
    IataCode::parse(s).unwrap()
}

fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

fn stamp(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn place_ref(iata: &str) -> PlaceRef {
    PlaceRef {
        iata_code: iata.to_string(),
        name: None,
        city_name: None,
    }
}

fn offer(id: &str, from: &str, to: &str, dep: NaiveDateTime, arr: NaiveDateTime, amount: &str) -> Offer {
    Offer {
        id: id.to_string(),
        total_amount: amount.to_string(),
        total_currency: Some("USD".to_string()),
        slices: vec![OfferSlice {
            origin: Some(place_ref(from)),
            destination: Some(place_ref(to)),
            duration: None,
            segments: vec![OfferSegment {
                origin: place_ref(from),
                destination: place_ref(to),
                departing_at: stamp(dep),
                arriving_at: stamp(arr),
                duration: None,
                distance: None,
                operating_carrier: Carrier {
                    name: "Duffel Airways".to_string(),
                    iata_code: Some("ZZ".to_string()),
                },
                marketing_carrier: None,
                operating_carrier_flight_number: Some("100".to_string()),
                marketing_carrier_flight_number: None,
                aircraft: None,
                stops: vec![],
            }],
        }],
    }
}

fn airport(iata: &str, lat: f64, lon: f64) -> Place {
    Place {
        kind: "airport".to_string(),
        iata_code: Some(iata.to_string()),
        latitude: Some(lat),
        longitude: Some(lon),
        name: Some(format!("{iata} Airport")),
        city_name: None,
    }
}

/// SNA, EWR and ORD with their real coordinates.
fn us_airports() -> MockDuffelClient {
    MockDuffelClient::new()
        .with_place(airport("SNA", 33.6757, -117.8682))
        .with_place(airport("EWR", 40.6925, -74.1687))
        .with_place(airport("ORD", 41.9786, -87.9048))
}

fn request() -> SearchRequest {
    SearchRequest::new(code("SNA"), code("EWR"), at(1, 6, 0))
}

/// No backoff sleeps, so tests run in real time.
fn config() -> SearchConfig {
    SearchConfig::default().with_retry(RetryPolicy::none())
}

#[tokio::test]
async fn direct_flight_found() {
    let mock = us_airports().with_offer(
        code("SNA"),
        code("EWR"),
        offer("off_direct", "SNA", "EWR", at(1, 8, 0), at(1, 16, 30), "450.00"),
    );
    let config = config();

    let planner = Planner::new(&mock, &mock, &config);
    let result = planner.search(&request()).await.unwrap();

    assert_eq!(result.phase(), SearchPhase::Succeeded);
    assert_eq!(result.itinerary.len(), 1);
    assert_eq!(result.itinerary.total_cost(), 450.0);
    assert_eq!(result.itinerary.airports(), vec![code("SNA"), code("EWR")]);
    assert_eq!(result.arrival.airport, code("EWR"));
    assert_eq!(result.arrival.stops, 1);
    assert_eq!(result.arrival.cost, 450.0);
    assert_eq!(result.arrival.datetime, at(1, 16, 30));
    assert!(result.expansions >= 1);
    assert!(result.place_lookups >= 1);
}

#[tokio::test]
async fn connection_over_budget_is_no_route() {
    // SNA -> ORD (300) -> EWR (800) totals 1100 against a budget of 1000.
    let mock = us_airports()
        .with_offer(
            code("SNA"),
            code("ORD"),
            offer("off_1", "SNA", "ORD", at(1, 8, 0), at(1, 14, 0), "300.00"),
        )
        .with_offer(
            code("ORD"),
            code("EWR"),
            offer("off_2", "ORD", "EWR", at(1, 16, 0), at(1, 19, 0), "800.00"),
        );
    let config = config();

    let planner = Planner::new(&mock, &mock, &config);
    let err = planner.search(&request()).await.unwrap_err();

    assert!(matches!(err, SearchError::NoRouteFound { .. }));
    assert_eq!(err.phase(), SearchPhase::Exhausted);
}

#[tokio::test]
async fn connection_within_budget_found() {
    let mock = us_airports()
        .with_offer(
            code("SNA"),
            code("ORD"),
            offer("off_1", "SNA", "ORD", at(1, 8, 0), at(1, 14, 0), "300.00"),
        )
        .with_offer(
            code("ORD"),
            code("EWR"),
            offer("off_2", "ORD", "EWR", at(1, 16, 0), at(1, 19, 0), "400.00"),
        );
    let config = config();

    let planner = Planner::new(&mock, &mock, &config);
    let result = planner.search(&request()).await.unwrap();

    assert_eq!(
        result.itinerary.airports(),
        vec![code("SNA"), code("ORD"), code("EWR")]
    );
    assert_eq!(result.itinerary.total_cost(), 700.0);
    assert_eq!(result.arrival.stops, 2);
}

#[tokio::test]
async fn too_many_stops_is_no_route() {
    let mock = us_airports()
        .with_offer(
            code("SNA"),
            code("ORD"),
            offer("off_1", "SNA", "ORD", at(1, 8, 0), at(1, 14, 0), "100.00"),
        )
        .with_offer(
            code("ORD"),
            code("EWR"),
            offer("off_2", "ORD", "EWR", at(1, 16, 0), at(1, 19, 0), "100.00"),
        );
    let config = config();

    let planner = Planner::new(&mock, &mock, &config);
    let err = planner
        .search(&request().with_max_stops(1))
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::NoRouteFound { .. }));
}

#[tokio::test]
async fn prefers_cheaper_connection_over_expensive_direct() {
    let mock = us_airports()
        .with_offer(
            code("SNA"),
            code("EWR"),
            offer("off_direct", "SNA", "EWR", at(1, 8, 0), at(1, 16, 30), "950.00"),
        )
        .with_offer(
            code("SNA"),
            code("ORD"),
            offer("off_1", "SNA", "ORD", at(1, 8, 0), at(1, 14, 0), "150.00"),
        )
        .with_offer(
            code("ORD"),
            code("EWR"),
            offer("off_2", "ORD", "EWR", at(1, 16, 0), at(1, 19, 0), "150.00"),
        );
    let config = config();

    let planner = Planner::new(&mock, &mock, &config);
    let result = planner.search(&request()).await.unwrap();

    assert_eq!(result.itinerary.total_cost(), 300.0);
    assert_eq!(result.itinerary.len(), 2);
}

#[tokio::test]
async fn intermediate_stay_respected() {
    // The 13:00 connection leaves one hour after landing at ORD; with a
    // two-hour minimum stay only the 16:00 one is usable.
    let mock = us_airports()
        .with_offer(
            code("SNA"),
            code("ORD"),
            offer("off_1", "SNA", "ORD", at(1, 8, 0), at(1, 12, 0), "300.00"),
        )
        .with_offers(
            code("ORD"),
            code("EWR"),
            vec![
                offer("off_tight", "ORD", "EWR", at(1, 13, 0), at(1, 16, 0), "200.00"),
                offer("off_relaxed", "ORD", "EWR", at(1, 16, 0), at(1, 19, 0), "300.00"),
            ],
        );
    let config = config();

    let planner = Planner::new(&mock, &mock, &config);
    let result = planner
        .search(&request().with_min_stay(Duration::hours(2)))
        .await
        .unwrap();

    let offers: Vec<_> = result
        .itinerary
        .actions()
        .iter()
        .map(|a| a.offer_id.as_str())
        .collect();
    assert_eq!(offers, vec!["off_1", "off_relaxed"]);
    assert_eq!(result.itinerary.total_cost(), 600.0);
}

/// One-hour flights on `from`-`to` leaving every hour from 06:00 to 11:00.
fn hourly(from: &str, to: &str, amount: &str) -> Vec<Offer> {
    (6..12)
        .map(|h| {
            let id = format!("off_{from}_{to}_{h}").to_lowercase();
            offer(&id, from, to, at(1, h, 0), at(1, h + 1, 0), amount)
        })
        .collect()
}

#[tokio::test]
async fn cycle_terminates() {
    // SNA, DEN and EWR all discover each other. SNA <-> DEN can be flown back
    // and forth all morning, but EWR is only reachable from DEN, at a price
    // that ranks every loop state ahead of it. Without dedup the six
    // same-priced departures fan out into hundreds of loop states.
    let max_stops = 6;
    let mock = us_airports()
        .with_place(airport("DEN", 39.8561, -104.6737))
        .with_offers(code("SNA"), code("DEN"), hourly("SNA", "DEN", "10.00"))
        .with_offers(code("DEN"), code("SNA"), hourly("DEN", "SNA", "10.00"))
        .with_offer(
            code("DEN"),
            code("EWR"),
            offer("off_goal", "DEN", "EWR", at(1, 12, 0), at(1, 17, 0), "300.00"),
        );
    let config = config().with_discovery(
        DiscoveryConfig::default().with_radius_bounds(10_000.0, 10_000.0),
    );

    let planner = Planner::new(&mock, &mock, &config);
    let result = planner
        .search(&request().with_max_stops(max_stops))
        .await
        .unwrap();

    assert_eq!(
        result.itinerary.airports(),
        vec![code("SNA"), code("DEN"), code("EWR")]
    );
    assert_eq!(result.itinerary.total_cost(), 310.0);
    // SNA and DEN at each stop count from 0 to 6, once each.
    assert_eq!(result.expansions, max_stops as usize + 1);
}

#[tokio::test]
async fn costlier_arrival_at_same_stop_count_is_pruned() {
    // Both SNA -> LAS -> ORD (350) and SNA -> DEN -> ORD (200) reach ORD
    // after two stops. LAS is expanded first, so its ORD state is queued
    // first and must be skipped once the cheaper one shows up.
    let mock = us_airports()
        .with_place(airport("DEN", 39.8561, -104.6737))
        .with_place(airport("LAS", 36.0840, -115.1537))
        .with_offer(
            code("SNA"),
            code("LAS"),
            offer("off_las", "SNA", "LAS", at(1, 8, 0), at(1, 9, 0), "50.00"),
        )
        .with_offer(
            code("SNA"),
            code("DEN"),
            offer("off_den", "SNA", "DEN", at(1, 8, 0), at(1, 10, 0), "100.00"),
        )
        .with_offer(
            code("LAS"),
            code("ORD"),
            offer("off_las_ord", "LAS", "ORD", at(1, 11, 0), at(1, 16, 0), "300.00"),
        )
        .with_offer(
            code("DEN"),
            code("ORD"),
            offer("off_den_ord", "DEN", "ORD", at(1, 12, 0), at(1, 15, 0), "100.00"),
        )
        .with_offer(
            code("ORD"),
            code("EWR"),
            offer("off_ord_ewr", "ORD", "EWR", at(1, 17, 0), at(1, 20, 0), "500.00"),
        );
    let config = config().with_discovery(
        DiscoveryConfig::default().with_radius_bounds(10_000.0, 10_000.0),
    );

    let planner = Planner::new(&mock, &mock, &config);
    let result = planner
        .search(&request().with_max_stops(3))
        .await
        .unwrap();

    assert_eq!(
        result.itinerary.airports(),
        vec![code("SNA"), code("DEN"), code("ORD"), code("EWR")]
    );
    assert_eq!(result.itinerary.total_cost(), 700.0);
    // SNA, LAS, DEN and the cheap ORD. The LAS-fed ORD never expands.
    assert_eq!(result.expansions, 4);
}

#[tokio::test]
async fn expansion_cap_returns_best_partial() {
    let mock = us_airports().with_offer(
        code("SNA"),
        code("ORD"),
        offer("off_1", "SNA", "ORD", at(1, 8, 0), at(1, 14, 0), "300.00"),
    );
    let config = config().with_max_expansions(1);

    let planner = Planner::new(&mock, &mock, &config);
    let err = planner.search(&request()).await.unwrap_err();

    assert_eq!(err.phase(), SearchPhase::TimedOut);
    match err {
        SearchError::Timeout {
            expansions,
            best_partial: Some(partial),
        } => {
            assert_eq!(expansions, 1);
            assert_eq!(partial.airports(), vec![code("SNA"), code("ORD")]);
            assert_eq!(partial.total_cost(), 300.0);
        }
        other => panic!("expected Timeout with a partial, got {other:?}"),
    }
}

#[tokio::test]
async fn zero_expansions_allowed_times_out_empty() {
    let mock = us_airports();
    let config = config().with_max_expansions(0);

    let planner = Planner::new(&mock, &mock, &config);
    let err = planner.search(&request()).await.unwrap_err();

    assert!(matches!(
        err,
        SearchError::Timeout {
            expansions: 0,
            best_partial: None
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn deadline_interrupts_slow_upstream() {
    let mock = us_airports()
        .with_offer(
            code("SNA"),
            code("EWR"),
            offer("off_direct", "SNA", "EWR", at(1, 8, 0), at(1, 16, 30), "450.00"),
        )
        .with_latency(std::time::Duration::from_millis(500));
    let config = config().with_deadline_ms(50);

    let planner = Planner::new(&mock, &mock, &config);
    let err = planner.search(&request()).await.unwrap_err();

    assert!(matches!(
        err,
        SearchError::Timeout {
            best_partial: None,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried() {
    let mock = us_airports()
        .with_offer(
            code("SNA"),
            code("EWR"),
            offer("off_direct", "SNA", "EWR", at(1, 8, 0), at(1, 16, 30), "450.00"),
        )
        .with_failures(code("SNA"), code("EWR"), 2);
    let config = SearchConfig::default();

    let planner = Planner::new(&mock, &mock, &config);
    let result = planner.search(&request()).await.unwrap();

    assert_eq!(result.itinerary.total_cost(), 450.0);
    assert_eq!(result.offer_requests, mock.offer_calls());
    // Three attempts for SNA-EWR, at least one for SNA-ORD.
    assert!(mock.offer_calls() >= 4);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_drop_the_edge() {
    let mock = us_airports()
        .with_offer(
            code("SNA"),
            code("EWR"),
            offer("off_direct", "SNA", "EWR", at(1, 8, 0), at(1, 16, 30), "450.00"),
        )
        .with_failures(code("SNA"), code("EWR"), 5);
    let config = SearchConfig::default();

    let planner = Planner::new(&mock, &mock, &config);
    let err = planner.search(&request()).await.unwrap_err();

    assert!(matches!(err, SearchError::NoRouteFound { .. }));
}

#[tokio::test]
async fn offers_through_cache() {
    let places = us_airports();
    let offers = CachedOfferClient::new(
        MockDuffelClient::new().with_offer(
            code("SNA"),
            code("EWR"),
            offer("off_direct", "SNA", "EWR", at(1, 8, 0), at(1, 16, 30), "450.00"),
        ),
        &CacheConfig::default(),
    );
    let config = config();

    let planner = Planner::new(&offers, &places, &config);
    let first = planner.search(&request()).await.unwrap();
    let calls_after_first = offers.inner().offer_calls();
    let second = planner.search(&request()).await.unwrap();

    assert_eq!(first.itinerary, second.itinerary);
    assert_eq!(offers.inner().offer_calls(), calls_after_first);
}

#[tokio::test]
async fn unknown_goal_is_no_route() {
    let mock = us_airports();
    let config = config();

    let planner = Planner::new(&mock, &mock, &config);
    let err = planner
        .search(&SearchRequest::new(code("SNA"), code("ZZZ"), at(1, 6, 0)))
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::NoRouteFound { expansions: 1 }));
}

#[tokio::test]
async fn invalid_requests_rejected() {
    let mock = us_airports();
    let config = config();
    let planner = Planner::new(&mock, &mock, &config);

    let same = SearchRequest::new(code("SNA"), code("SNA"), at(1, 6, 0));
    let err = planner.search(&same).await.unwrap_err();
    assert!(matches!(err, SearchError::InvalidRequest(_)));
    assert_eq!(err.phase(), SearchPhase::Initialized);

    let broke = request().with_budget(-1.0);
    assert!(matches!(
        planner.search(&broke).await,
        Err(SearchError::InvalidRequest(_))
    ));

    let nan = request().with_budget(f64::NAN);
    assert!(nan.validate().is_err());

    let negative_stay = request().with_min_stay(Duration::hours(-1));
    assert!(negative_stay.validate().is_err());

    // Nothing went upstream.
    assert_eq!(mock.place_calls(), 0);
}

#[test]
fn request_defaults() {
    let request = request().with_cities("Santa Ana", "Newark");

    assert_eq!(request.budget, 1000.0);
    assert_eq!(request.max_stops, 2);
    assert_eq!(request.trip_days, 10);
    assert_eq!(request.min_stay, Duration::zero());
    assert_eq!(request.origin_city, "Santa Ana");
    assert_eq!(request.goal_city, "Newark");
    assert!(request.validate().is_ok());
}

#[test]
fn sna_ewr_midpoint() {
    let sna = Coordinates::new(33.6757, -117.8682);
    let ewr = Coordinates::new(40.6925, -74.1687);
    let mid = sna.midpoint(&ewr);
    assert!((mid.latitude - 37.1841).abs() < 1e-9);
    assert!((mid.longitude - -96.01845).abs() < 1e-9);
}
