//! Duffel HTTP client.
//!
//! Provides async methods for the two Duffel endpoints the planner needs:
//! offer requests and place suggestions. Handles authentication, version
//! headers and bounding concurrent requests.

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::planner::{OfferProvider, PlaceProvider};

use super::error::DuffelError;
use super::types::{DataEnvelope, Offer, OfferRequest, OfferRequestData, Place, PlaceQuery};

/// Default base URL for the Duffel API.
const DEFAULT_BASE_URL: &str = "https://api.duffel.com";

/// Default API version sent in the `Duffel-Version` header.
const DEFAULT_API_VERSION: &str = "v2";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the Duffel client.
#[derive(Debug, Clone)]
pub struct DuffelConfig {
    /// Bearer access token
    pub access_token: String,
    /// Base URL for the API (defaults to production Duffel)
    pub base_url: String,
    /// Value of the `Duffel-Version` header
    pub api_version: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DuffelConfig {
    /// Create a new config with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API version header.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Duffel API client.
///
/// Cheap to clone; clones share the connection pool and the concurrency
/// limit, so one client can be handed to every part of a search.
#[derive(Debug, Clone)]
pub struct DuffelClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl DuffelClient {
    /// Create a new Duffel client with the given configuration.
    pub fn new(config: DuffelConfig) -> Result<Self, DuffelError> {
        let mut headers = HeaderMap::new();

        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| DuffelError::Api {
                status: 0,
                message: "Invalid access token format".to_string(),
            })?;
        headers.insert(AUTHORIZATION, bearer);

        let version = HeaderValue::from_str(&config.api_version).map_err(|_| DuffelError::Api {
            status: 0,
            message: "Invalid API version format".to_string(),
        })?;
        headers.insert(HeaderName::from_static("duffel-version"), version);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Search for offers for a single-slice, one-adult, economy trip.
    pub async fn search_offers(&self, request: &OfferRequest) -> Result<Vec<Offer>, DuffelError> {
        let _permit = self.permit().await?;

        let url = format!("{}/air/offer_requests", self.base_url);
        let body = DataEnvelope {
            data: request.to_body(),
        };

        debug!(
            origin = %request.origin,
            destination = %request.destination,
            date = %request.departure_date,
            "Requesting offers"
        );

        let response = self
            .http
            .post(&url)
            .query(&[("return_offers", "true")])
            .json(&body)
            .send()
            .await?;

        let data: DataEnvelope<OfferRequestData> = read_json(response).await?;
        Ok(data.data.offers)
    }

    /// List places matching a query. The service returns at most 20.
    pub async fn list_places(&self, query: &PlaceQuery) -> Result<Vec<Place>, DuffelError> {
        let _permit = self.permit().await?;

        let url = format!("{}/places/suggestions", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&query.to_params())
            .send()
            .await?;

        let data: DataEnvelope<Vec<Place>> = read_json(response).await?;
        Ok(data.data)
    }

    async fn permit(&self) -> Result<tokio::sync::SemaphorePermit<'_>, DuffelError> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| DuffelError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })
    }
}

/// Map the status code to an error, then decode the body.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DuffelError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(DuffelError::Unauthorized);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(DuffelError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DuffelError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| DuffelError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })
}

impl OfferProvider for DuffelClient {
    async fn search_offers(&self, request: &OfferRequest) -> Result<Vec<Offer>, DuffelError> {
        DuffelClient::search_offers(self, request).await
    }
}

impl PlaceProvider for DuffelClient {
    async fn list_places(&self, query: &PlaceQuery) -> Result<Vec<Place>, DuffelError> {
        DuffelClient::list_places(self, query).await
    }
}
