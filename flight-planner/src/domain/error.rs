//! Domain error types.
//!
//! These errors represent validation failures when constructing domain
//! values. They are distinct from API/IO errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A travel action must contain at least one segment
    #[error("travel action must have at least one segment")]
    EmptyAction,

    /// Cost is negative or not a number
    #[error("invalid cost: {0}")]
    InvalidCost(f64),

    /// Segment durations sum past what a duration can hold
    #[error("total flight duration overflows")]
    DurationOverflow,
}
