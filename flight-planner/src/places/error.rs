//! Place lookup errors.

use crate::domain::IataCode;
use crate::duffel::DuffelError;

/// Error resolving or searching for places.
#[derive(Debug, thiserror::Error)]
pub enum PlaceError {
    /// The places service knows no airport with this code
    #[error("no airport found for {0}")]
    NotFound(IataCode),

    /// The places service failed (after retries)
    #[error("places service error: {0}")]
    Service(#[from] DuffelError),
}
