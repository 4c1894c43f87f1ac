//! Search configuration for the itinerary planner.

use std::time::Duration;

use crate::places::DiscoveryConfig;
use crate::retry::RetryPolicy;

use super::evaluate::EvaluatorWeights;

/// Configuration parameters for itinerary search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of offer requests in flight per expansion.
    /// Higher values increase parallelism at the cost of rate limits.
    pub batch_size: usize,

    /// Maximum number of states to expand before giving up.
    pub max_expansions: usize,

    /// Wall-clock budget for the whole search (milliseconds).
    pub deadline_ms: u64,

    /// Sizing of the neighbour discovery circle.
    pub discovery: DiscoveryConfig,

    /// Weights of the frontier score.
    pub weights: EvaluatorWeights,

    /// Retry policy for every upstream call.
    pub retry: RetryPolicy,
}

impl SearchConfig {
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn with_max_expansions(mut self, n: usize) -> Self {
        self.max_expansions = n;
        self
    }

    pub fn with_deadline_ms(mut self, ms: u64) -> Self {
        self.deadline_ms = ms;
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_weights(mut self, weights: EvaluatorWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the deadline as a Duration.
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: 8,
            max_expansions: 200,
            deadline_ms: 60_000, // 1 minute
            discovery: DiscoveryConfig::default(),
            weights: EvaluatorWeights::default(),
            retry: RetryPolicy::default(),
        }
    }
}
