//! Geographic coordinates and great-circle distance.

/// Mean Earth radius used for all distance calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Arithmetic mean of both coordinate pairs.
    ///
    /// This is a planar approximation rather than the geodesic midpoint. It
    /// is close enough for continental hops but drifts for very long or
    /// antimeridian-crossing pairs.
    pub fn midpoint(&self, other: &Coordinates) -> Coordinates {
        Coordinates {
            latitude: (self.latitude + other.latitude) / 2.0,
            longitude: (self.longitude + other.longitude) / 2.0,
        }
    }
}

/// Great-circle distance in kilometres using the spherical law of cosines.
///
/// The cosine term is clamped to `[-1, 1]` so floating-point overshoot for
/// identical or antipodal points never produces `NaN`.
///
/// # Examples
///
/// ```
/// use flight_planner::domain::distance_km;
///
/// assert_eq!(distance_km(33.67, -117.87, 33.67, -117.87), 0.0);
/// let d = distance_km(33.6757, -117.8682, 40.6925, -74.1687);
/// assert!((d - 3908.0).abs() < 10.0);
/// ```
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let cosine = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * delta_lon.cos();
    let angle = cosine.clamp(-1.0, 1.0).acos();

    angle * EARTH_RADIUS_KM
}
