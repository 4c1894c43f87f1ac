//! Duffel client error types.

/// Errors from the Duffel HTTP client (and its mock).
#[derive(Debug, thiserror::Error)]
pub enum DuffelError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by Duffel API")]
    RateLimited,

    /// Invalid access token or unauthorized
    #[error("unauthorized (invalid access token)")]
    Unauthorized,

    /// Mock fixture data could not be loaded
    #[error("fixture error: {0}")]
    Fixture(String),
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(" (body: {b})"))
        .unwrap_or_default()
}

impl DuffelError {
    /// Whether retrying the same call might succeed.
    ///
    /// Transport failures, rate limiting and server-side errors are
    /// transient; authentication and client errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            DuffelError::Http(_) | DuffelError::RateLimited => true,
            DuffelError::Api { status, .. } => *status >= 500,
            DuffelError::Json { .. } | DuffelError::Unauthorized | DuffelError::Fixture(_) => {
                false
            }
        }
    }
}
