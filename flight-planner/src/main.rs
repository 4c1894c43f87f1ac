use std::process::ExitCode;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flight_planner::cache::{CacheConfig, CachedOfferClient};
use flight_planner::domain::{IataCode, parse_iso8601};
use flight_planner::duffel::{DuffelClient, DuffelConfig, MockDuffelClient, parse_timestamp};
use flight_planner::planner::{
    OfferProvider, PlaceProvider, Planner, SearchConfig, SearchError, SearchRequest,
};

const USAGE: &str = "usage: flight-planner ORIGIN GOAL DATE [BUDGET] [MAX_STOPS] [DAYS] [MIN_STAY]\n\nMIN_STAY is an ISO-8601 duration such as PT2H.";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = match parse_args(&args) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    let search_config = SearchConfig::default();

    // Mock data takes precedence so the planner can run offline
    if let Ok(dir) = std::env::var("FLIGHT_PLANNER_MOCK_DIR") {
        let mock = match MockDuffelClient::from_dir(&dir) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Failed to load mock data from {dir}: {e}");
                return ExitCode::FAILURE;
            }
        };
        info!(dir = %dir, "Using mock Duffel data");
        return run(&mock, &mock, &search_config, &request).await;
    }

    let token = std::env::var("DUFFEL_ACCESS_TOKEN").unwrap_or_else(|_| {
        eprintln!("Warning: DUFFEL_ACCESS_TOKEN not set. API calls will fail.");
        String::new()
    });

    let client = match DuffelClient::new(DuffelConfig::new(token)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create Duffel client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let offers = CachedOfferClient::new(client.clone(), &CacheConfig::default());

    run(&offers, &client, &search_config, &request).await
}

async fn run<O: OfferProvider, P: PlaceProvider>(
    offers: &O,
    places: &P,
    config: &SearchConfig,
    request: &SearchRequest,
) -> ExitCode {
    let planner = Planner::new(offers, places, config);

    match planner.search(request).await {
        Ok(result) => {
            println!("{}", result.itinerary);
            info!(
                expansions = result.expansions,
                offer_requests = result.offer_requests,
                place_lookups = result.place_lookups,
                "Search complete"
            );
            ExitCode::SUCCESS
        }
        Err(SearchError::Timeout {
            best_partial: Some(partial),
            ..
        }) => {
            println!("Search timed out. Closest partial itinerary:");
            println!("{partial}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> Result<SearchRequest, String> {
    let [origin, goal, date, rest @ ..] = args else {
        return Err("missing arguments".to_string());
    };

    let origin = IataCode::parse_lenient(origin).map_err(|e| e.to_string())?;
    let goal = IataCode::parse_lenient(goal).map_err(|e| e.to_string())?;
    let departure = parse_departure(date)?;

    let mut request = SearchRequest::new(origin, goal, departure);

    if let Some(budget) = rest.first() {
        let budget = budget
            .parse::<f64>()
            .map_err(|_| format!("invalid budget: {budget}"))?;
        request = request.with_budget(budget);
    }
    if let Some(stops) = rest.get(1) {
        let stops = stops
            .parse::<u32>()
            .map_err(|_| format!("invalid stop limit: {stops}"))?;
        request = request.with_max_stops(stops);
    }
    if let Some(days) = rest.get(2) {
        let days = days
            .parse::<u32>()
            .map_err(|_| format!("invalid trip length: {days}"))?;
        request = request.with_trip_days(days);
    }
    if let Some(stay) = rest.get(3) {
        let stay = parse_iso8601(stay).map_err(|e| format!("invalid minimum stay: {e}"))?;
        request = request.with_min_stay(stay);
    }

    Ok(request)
}

/// A bare date departs at midnight.
fn parse_departure(s: &str) -> Result<NaiveDateTime, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    parse_timestamp(s).map_err(|e| e.to_string())
}
