//! Airport code types.

use std::fmt;

/// Error returned when parsing an invalid IATA airport code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid IATA code: {reason}")]
pub struct InvalidIataCode {
    reason: &'static str,
}

/// A valid 3-letter IATA airport code.
///
/// IATA codes are always 3 uppercase ASCII letters. Any `IataCode` value is
/// valid by construction, so lookups keyed by it never see malformed codes.
///
/// # Examples
///
/// ```
/// use flight_planner::domain::IataCode;
///
/// let sna = IataCode::parse("SNA").unwrap();
/// assert_eq!(sna.as_str(), "SNA");
///
/// // Lowercase is rejected
/// assert!(IataCode::parse("sna").is_err());
///
/// // Wrong length is rejected
/// assert!(IataCode::parse("KJ").is_err());
/// assert!(IataCode::parse("KSNA").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IataCode([u8; 3]);

impl IataCode {
    /// Parse an IATA code from a string.
    ///
    /// The input must be exactly 3 uppercase ASCII letters (A-Z).
    pub fn parse(s: &str) -> Result<Self, InvalidIataCode> {
        let bytes = s.as_bytes();

        if bytes.len() != 3 {
            return Err(InvalidIataCode {
                reason: "must be exactly 3 characters",
            });
        }

        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(InvalidIataCode {
                reason: "must be uppercase ASCII letters A-Z",
            });
        }

        Ok(IataCode([bytes[0], bytes[1], bytes[2]]))
    }

    /// Parse a code that may arrive in lowercase from an upstream service.
    pub fn parse_lenient(s: &str) -> Result<Self, InvalidIataCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Debug for IataCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IataCode({})", self.as_str())
    }
}

impl fmt::Display for IataCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
