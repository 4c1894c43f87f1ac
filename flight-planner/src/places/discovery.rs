//! Candidate next airports around the current position and the goal.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{IataCode, distance_km};
use crate::duffel::PlaceQuery;
use crate::planner::PlaceProvider;

use super::error::PlaceError;
use super::resolver::PlaceResolver;

/// Sizing of the discovery circle.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Radius as a fraction of the current-to-goal distance.
    pub radius_scale: f64,
    pub min_radius_km: f64,
    pub max_radius_km: f64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            radius_scale: 0.5,
            min_radius_km: 50.0,
            max_radius_km: 5_000.0,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_radius_scale(mut self, scale: f64) -> Self {
        self.radius_scale = scale;
        self
    }

    pub fn with_radius_bounds(mut self, min_km: f64, max_km: f64) -> Self {
        self.min_radius_km = min_km;
        self.max_radius_km = max_km;
        self
    }

    /// Search radius for a given current-to-goal distance.
    pub fn radius_km(&self, distance_km: f64) -> f64 {
        (distance_km * self.radius_scale)
            .max(self.min_radius_km)
            .min(self.max_radius_km)
    }
}

/// Finds airports worth flying to next.
///
/// The circle is centred on the midpoint of the current airport and the
/// goal. The midpoint is the arithmetic mean of the coordinates, which is
/// poor across the antimeridian and at high latitudes.
pub struct NeighborDiscovery<'r, 'a, P> {
    resolver: &'r PlaceResolver<'a, P>,
    config: &'r DiscoveryConfig,
}

impl<'r, 'a, P: PlaceProvider> NeighborDiscovery<'r, 'a, P> {
    pub fn new(resolver: &'r PlaceResolver<'a, P>, config: &'r DiscoveryConfig) -> Self {
        Self { resolver, config }
    }

    /// Candidate airports for the next leg from `current`.
    ///
    /// Always contains `goal`. Never contains `current` unless it is the goal.
    pub async fn candidates(
        &self,
        current: IataCode,
        goal: IataCode,
    ) -> Result<HashSet<IataCode>, PlaceError> {
        let (here, there) = futures::try_join!(
            self.resolver.resolve(current),
            self.resolver.resolve(goal)
        )?;

        let distance = distance_km(here.latitude, here.longitude, there.latitude, there.longitude);
        let radius_km = self.config.radius_km(distance);
        let center = here.midpoint(&there);

        let places = self
            .resolver
            .search(&PlaceQuery::Radius {
                center,
                radius_m: (radius_km * 1000.0).round() as u64,
            })
            .await?;

        let mut candidates = HashSet::new();
        for place in places.iter().filter(|p| p.is_airport()) {
            let Some(code) = place.code() else {
                continue;
            };
            if let Some(coords) = place.coordinates() {
                self.resolver.remember(code, coords).await;
            }
            candidates.insert(code);
        }

        candidates.insert(goal);
        if current != goal {
            candidates.remove(&current);
        }

        debug!(
            current = %current,
            goal = %goal,
            distance_km = distance,
            radius_km,
            candidates = candidates.len(),
            "Discovered candidate airports"
        );

        Ok(candidates)
    }
}
